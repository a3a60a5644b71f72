use rand::Rng;
use serde::Serialize;

use crate::models::{ParticipantId, ProgressData};

/// Shown to a participant who still has company to wait for. Picked at
/// random on every recomputation, so it changes across renders.
pub const INDIVIDUAL_QUOTES: [&str; 7] = [
    "妳的禱告正在撼動天際！",
    "堅持下去，神正在動工！",
    "今天的妳，比昨天更剛強。",
    "禁食是靈裡的飛翔，加油！",
    "主看見妳的擺上，必親自報答。",
    "妳是蒙愛的，妳是寶貴的。",
    "在安靜中重新得力。",
];

#[derive(Debug, Clone, Copy)]
pub struct Verse {
    pub text: &'static str,
    pub reference: &'static str,
}

/// Shown on a day all three have completed. Picked by hashing the date
/// key, so the same day always shows the same verse.
pub const GROUP_VERSES: [Verse; 5] = [
    Verse {
        text: "靠著愛我們的主，在這一切的事上已經得勝有餘了。",
        reference: "羅馬書 8:37",
    },
    Verse {
        text: "三股合成的繩子不容易折斷。",
        reference: "傳道書 4:12",
    },
    Verse {
        text: "你們祈求，就給你們；尋找，就尋見；叩門，就給你們開門。",
        reference: "馬太福音 7:7",
    },
    Verse {
        text: "那等候耶和華的必從新得力。",
        reference: "以賽亞書 40:31",
    },
    Verse {
        text: "你們若有信心像一粒芥菜種，就是對這座山說：『你從這邊挪到那邊』，它也必挪去。",
        reference: "馬太福音 17:20",
    },
];

#[derive(Debug, Clone, Serialize)]
pub struct Encouragement {
    pub text: &'static str,
    pub reference: Option<&'static str>,
}

pub fn is_user_checked_in(data: &ProgressData, today_key: &str, id: ParticipantId) -> bool {
    data.get(today_key).is_some_and(|record| record.flag(id))
}

/// True iff a record exists for the date and every participant's flag
/// is set on it.
pub fn all_users_checked_in(data: &ProgressData, today_key: &str) -> bool {
    data.get(today_key)
        .is_some_and(|record| ParticipantId::ALL.iter().all(|id| record.flag(*id)))
}

/// Stable per day: sum of the key's character codes mod the list length.
pub fn group_verse_index(today_key: &str) -> usize {
    let sum: u32 = today_key.bytes().map(u32::from).sum();
    sum as usize % GROUP_VERSES.len()
}

pub fn group_verse(today_key: &str) -> Verse {
    GROUP_VERSES[group_verse_index(today_key)]
}

pub fn individual_quote() -> &'static str {
    let index = rand::thread_rng().gen_range(0..INDIVIDUAL_QUOTES.len());
    INDIVIDUAL_QUOTES[index]
}

pub fn encouragement(all_checked_in: bool, today_key: &str) -> Encouragement {
    if all_checked_in {
        let verse = group_verse(today_key);
        Encouragement {
            text: verse.text,
            reference: Some(verse.reference),
        }
    } else {
        Encouragement {
            text: individual_quote(),
            reference: None,
        }
    }
}
