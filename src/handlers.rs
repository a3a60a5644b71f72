use crate::campaign::{self, FUTURE_LOCK_MESSAGE};
use crate::errors::AppError;
use crate::models::{
    CheckInRequest, IdentityQuery, ParticipantStatus, ProgressData, TodayResponse,
};
use crate::participants;
use crate::state::AppState;
use crate::ui::render_index;
use crate::view;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Html, IntoResponse,
    },
    Json,
};
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;

pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<IdentityQuery>,
) -> Html<String> {
    let participant = participants::resolve(params.p.as_deref());
    let snapshot = state.campaign.snapshot();
    Html(render_index(participant, &snapshot, &state.campaign))
}

pub async fn get_today(
    State(state): State<AppState>,
    Query(params): Query<IdentityQuery>,
) -> Json<TodayResponse> {
    let participant = participants::resolve(params.p.as_deref());
    let snapshot = state.campaign.snapshot();
    let (data, _rx) = state.store.subscribe().await.into_parts();

    let record = data.get(&snapshot.today_key);
    let statuses = participants::ROSTER
        .iter()
        .map(|entry| ParticipantStatus {
            id: entry.id,
            name: entry.name,
            accent: entry.accent,
            done: record.is_some_and(|r| r.flag(entry.id)),
        })
        .collect();

    let checked_in = view::is_user_checked_in(&data, &snapshot.today_key, participant.id);
    let all_checked_in = view::all_users_checked_in(&data, &snapshot.today_key);
    let message = view::encouragement(all_checked_in, &snapshot.today_key);

    Json(TodayResponse {
        date: snapshot.today_key.clone(),
        day_index: snapshot.day_index,
        total_days: state.campaign.total_days(),
        demo_mode: snapshot.demo_mode,
        date_display: campaign::display_date_with_weekday(snapshot.today),
        participant: participant.clone(),
        checked_in,
        all_checked_in,
        statuses,
        message,
    })
}

pub async fn get_progress(State(state): State<AppState>) -> Json<ProgressData> {
    let (data, _rx) = state.store.subscribe().await.into_parts();
    Json(data)
}

/// Fire-and-forget toggle: on success nothing is returned and the new
/// state reaches the page through the event stream.
pub async fn check_in(
    State(state): State<AppState>,
    Json(payload): Json<CheckInRequest>,
) -> Result<StatusCode, AppError> {
    let date = campaign::parse_date_key(payload.date.trim())
        .ok_or_else(|| AppError::bad_request("date must be YYYY-MM-DD"))?;

    let snapshot = state.campaign.snapshot();
    if !snapshot.allows_toggle(date) {
        return Err(AppError::forbidden(FUTURE_LOCK_MESSAGE));
    }

    let key = campaign::date_key(date);
    state
        .store
        .toggle_check_in(&key, payload.participant, payload.current_status)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// SSE stream of full progress snapshots: one on connect, one per
/// store change. Closing the connection drops the subscription.
pub async fn events(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let (initial, rx) = state.store.subscribe().await.into_parts();
    let first = snapshot_event(&initial).map_err(AppError::internal)?;
    let updates = BroadcastStream::new(rx)
        .filter_map(|msg| msg.ok().and_then(|data| snapshot_event(&data).ok()));
    let stream = tokio_stream::once(first)
        .chain(updates)
        .map(Ok::<Event, Infallible>);
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

fn snapshot_event(data: &ProgressData) -> Result<Event, serde_json::Error> {
    Ok(Event::default()
        .event("progress")
        .data(serde_json::to_string(data)?))
}
