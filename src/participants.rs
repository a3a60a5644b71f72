use crate::models::{Participant, ParticipantId};

/// The fixed roster. Order matters: it is the display order and the
/// order used by the all-complete derivation.
pub const ROSTER: [Participant; 3] = [
    Participant {
        id: ParticipantId::Xiaolu,
        name: "小路",
        accent: "#38bdf8",
    },
    Participant {
        id: ParticipantId::Jingfang,
        name: "靜芳",
        accent: "#fb7185",
    },
    Participant {
        id: ParticipantId::Jingyi,
        name: "靜怡",
        accent: "#fbbf24",
    },
];

pub const DEFAULT_PARTICIPANT: ParticipantId = ParticipantId::Xiaolu;

pub fn by_id(id: ParticipantId) -> &'static Participant {
    match id {
        ParticipantId::Xiaolu => &ROSTER[0],
        ParticipantId::Jingfang => &ROSTER[1],
        ParticipantId::Jingyi => &ROSTER[2],
    }
}

/// Maps the `?p=` query token to a participant. Unknown or absent
/// tokens silently fall back to the default identity.
pub fn resolve(token: Option<&str>) -> &'static Participant {
    token
        .and_then(ParticipantId::parse)
        .map(by_id)
        .unwrap_or_else(|| by_id(DEFAULT_PARTICIPANT))
}
