use crate::campaign::{self, CampaignWindow, DaySnapshot};
use crate::models::Participant;
use crate::participants::ROSTER;
use serde::Serialize;

#[derive(Serialize)]
struct DayCell {
    day: u32,
    date: String,
    display: String,
}

pub fn render_index(
    participant: &Participant,
    snapshot: &DaySnapshot,
    campaign: &CampaignWindow,
) -> String {
    let days: Vec<DayCell> = (1..=campaign.total_days())
        .map(|day| {
            let date = campaign.date_for_day(day);
            DayCell {
                day,
                date: campaign::date_key(date),
                display: campaign::display_date(date),
            }
        })
        .collect();
    let days_json = serde_json::to_string(&days).unwrap_or_else(|_| "[]".to_string());
    let roster_json = serde_json::to_string(&ROSTER).unwrap_or_else(|_| "[]".to_string());

    INDEX_HTML
        .replace("{{PARTICIPANT_ID}}", participant.id.as_str())
        .replace("{{PARTICIPANT_NAME}}", participant.name)
        .replace("{{DAY_INDEX}}", &snapshot.day_index.to_string())
        .replace("{{TOTAL_DAYS}}", &campaign.total_days().to_string())
        .replace(
            "{{DATE_DISPLAY}}",
            &campaign::display_date_with_weekday(snapshot.today),
        )
        .replace("{{DEMO_HIDDEN}}", if snapshot.demo_mode { "" } else { "hidden" })
        .replace("{{DEMO_MODE}}", if snapshot.demo_mode { "true" } else { "false" })
        .replace("{{UNLOCKED_THROUGH}}", &snapshot.unlocked_through.to_string())
        .replace("{{DAYS_JSON}}", &days_json)
        .replace("{{ROSTER_JSON}}", &roster_json)
}

const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="zh-Hant">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>21天打卡</title>
  <style>
    :root {
      --bg: #fdf4ff;
      --ink: #1e1b4b;
      --accent: #a21caf;
      --accent-soft: #f5d0fe;
      --deep: #3730a3;
      --card: #ffffff;
      --muted: #6b7280;
      --leaf: #0f766e;
      --shadow: 0 20px 50px rgba(112, 26, 117, 0.12);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "PingFang TC", "Noto Sans TC", "Microsoft JhengHei", sans-serif;
      display: flex;
      justify-content: center;
      padding: 32px 16px 48px;
    }

    .app {
      width: min(520px, 100%);
      display: grid;
      gap: 24px;
    }

    header {
      text-align: center;
      display: grid;
      gap: 8px;
    }

    h1 {
      margin: 0;
      font-size: 1.8rem;
      letter-spacing: 0.04em;
    }

    .subtitle {
      margin: 0;
      color: var(--deep);
      font-weight: 500;
    }

    .identity {
      justify-self: center;
      background: var(--card);
      padding: 4px 16px;
      border-radius: 999px;
      border: 1px solid var(--accent-soft);
      font-size: 0.9rem;
      color: var(--muted);
    }

    .identity-name {
      color: var(--deep);
      font-weight: 700;
    }

    .demo-banner {
      justify-self: center;
      font-size: 0.8rem;
      color: #b45309;
      background: #fef3c7;
      padding: 4px 12px;
      border-radius: 10px;
    }

    .hidden {
      display: none;
    }

    .card {
      background: var(--card);
      border-radius: 24px;
      padding: 24px;
      border: 3px solid var(--accent);
      box-shadow: var(--shadow);
    }

    .panel-head {
      display: flex;
      justify-content: space-between;
      align-items: baseline;
      border-bottom: 1px solid var(--accent-soft);
      padding-bottom: 12px;
      margin-bottom: 16px;
    }

    .label {
      color: var(--muted);
      letter-spacing: 0.1em;
    }

    .day-meta {
      text-align: right;
      display: grid;
      gap: 2px;
    }

    .day-count {
      font-size: 1.7rem;
      font-weight: 700;
      color: var(--accent);
    }

    .day-total {
      font-size: 1rem;
      font-weight: 400;
      color: #d946ef;
    }

    .day-date {
      font-weight: 700;
      color: var(--muted);
    }

    .member-rows {
      display: grid;
      gap: 12px;
      margin-bottom: 20px;
    }

    .member-row {
      display: flex;
      justify-content: space-between;
      align-items: center;
    }

    .member-left {
      display: inline-flex;
      align-items: center;
      gap: 10px;
    }

    .member-dot {
      width: 12px;
      height: 12px;
      border-radius: 50%;
      display: inline-block;
    }

    .member-name {
      font-size: 1.2rem;
      font-weight: 800;
      color: var(--deep);
    }

    .member-state {
      color: var(--muted);
    }

    .member-state.done {
      color: var(--leaf);
      font-weight: 700;
    }

    .checkin {
      appearance: none;
      width: 100%;
      border: none;
      border-radius: 14px;
      padding: 16px;
      font-size: 1.1rem;
      font-weight: 700;
      cursor: pointer;
      color: white;
      background: var(--deep);
      transition: transform 150ms ease, background 150ms ease;
    }

    .checkin:active {
      transform: scale(0.98);
    }

    .checkin.checked {
      background: #1e1b4b;
      cursor: default;
    }

    .message-box {
      margin-top: 18px;
      background: #eef2ff;
      border: 1px solid #e0e7ff;
      border-radius: 14px;
      padding: 14px;
      text-align: center;
    }

    #message-text {
      margin: 0;
      color: var(--deep);
      line-height: 1.6;
    }

    #message-ref {
      margin: 8px 0 0;
      font-size: 0.75rem;
      font-weight: 700;
      letter-spacing: 0.2em;
      color: #818cf8;
    }

    .celebrate {
      margin-top: 14px;
      text-align: center;
      font-weight: 700;
      color: var(--accent);
    }

    .board-head {
      display: flex;
      flex-wrap: wrap;
      justify-content: space-between;
      align-items: center;
      gap: 12px;
    }

    .board-head h2 {
      margin: 0;
      font-size: 1.2rem;
      color: var(--deep);
    }

    .tabs {
      display: flex;
      gap: 6px;
      padding: 4px;
      background: #eef2ff;
      border-radius: 999px;
    }

    .tab {
      border: none;
      background: transparent;
      border-radius: 999px;
      padding: 6px 14px;
      font-weight: 700;
      color: var(--muted);
      cursor: pointer;
    }

    .tab.active {
      background: white;
      color: var(--deep);
      box-shadow: 0 6px 14px rgba(55, 48, 163, 0.15);
    }

    .hint {
      margin: 12px 0;
      font-size: 0.8rem;
      font-weight: 700;
      color: var(--accent);
      text-align: center;
    }

    .board-list {
      display: grid;
      gap: 10px;
    }

    .day-row {
      display: flex;
      align-items: center;
      gap: 12px;
      padding: 8px 10px;
      border-radius: 12px;
      border: 1px solid #f3e8ff;
    }

    .day-row.locked {
      opacity: 0.45;
    }

    .day-label {
      min-width: 92px;
      font-weight: 800;
      color: var(--deep);
    }

    .day-display {
      min-width: 46px;
      font-weight: 700;
      color: var(--accent);
    }

    .day-node {
      width: 26px;
      height: 26px;
      border-radius: 50%;
      border: 3px solid var(--accent-soft);
      background: #fdf4ff;
      cursor: pointer;
      transition: transform 150ms ease;
    }

    .day-row.locked .day-node {
      cursor: not-allowed;
    }

    .day-row:not(.locked) .day-node:hover {
      transform: scale(1.15);
    }

    .day-node.done {
      background: var(--deep);
      border-color: #c7d2fe;
    }

    .day-dots {
      display: inline-flex;
      gap: 4px;
      margin-left: auto;
    }

    .day-dots span {
      width: 8px;
      height: 8px;
      border-radius: 50%;
      background: #f3f4f6;
    }

    .day-grape {
      font-size: 1.2rem;
    }

    .board-calendar {
      display: grid;
      grid-template-columns: repeat(7, 1fr);
      gap: 8px;
    }

    .weekday {
      text-align: center;
      font-size: 0.75rem;
      font-weight: 700;
      color: #a5b4fc;
    }

    .day-cell {
      aspect-ratio: 1;
      border-radius: 10px;
      border: 1px solid #f3f4f6;
      display: flex;
      flex-direction: column;
      align-items: center;
      justify-content: center;
      gap: 4px;
      cursor: pointer;
      transition: border-color 150ms ease;
    }

    .day-cell:hover:not(.locked) {
      border-color: var(--accent);
    }

    .day-cell.locked {
      opacity: 0.4;
      cursor: not-allowed;
    }

    .day-cell.done {
      background: #eef2ff;
      border-color: #c7d2fe;
    }

    .day-cell .num {
      font-size: 0.75rem;
      font-weight: 700;
      color: var(--muted);
    }

    .day-cell.done .num {
      color: var(--deep);
    }

    .cell-dots {
      display: flex;
      gap: 3px;
    }

    .cell-dots span {
      width: 6px;
      height: 6px;
      border-radius: 50%;
      background: #f3f4f6;
    }

    .status {
      min-height: 1.2em;
      text-align: center;
      font-size: 0.9rem;
      color: var(--muted);
    }

    .status[data-type="error"] {
      color: #c63b2b;
    }

    .status[data-type="ok"] {
      color: #2d7a4b;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>21天禁禱結果子打卡</h1>
      <p class="subtitle">12/1起，三人同心，展開與神更親密同行的神蹟之旅！</p>
      <div class="identity">您目前的身份是: <span class="identity-name">{{PARTICIPANT_NAME}}</span></div>
      <div class="demo-banner {{DEMO_HIDDEN}}">⚠️ 預演模式：目前日期早於開始日，系統模擬為 Day 1</div>
    </header>

    <section class="card">
      <div class="panel-head">
        <span class="label">今日進度</span>
        <div class="day-meta">
          <span class="day-count">Day {{DAY_INDEX}}<span class="day-total"> / {{TOTAL_DAYS}}</span></span>
          <span class="day-date">{{DATE_DISPLAY}}</span>
        </div>
      </div>

      <div id="member-rows" class="member-rows"></div>

      <button id="checkin-btn" class="checkin" type="button">點擊打卡</button>

      <div class="message-box">
        <p id="message-text"></p>
        <p id="message-ref"></p>
      </div>
      <div id="celebrate" class="celebrate hidden">🍇 三人同心，今日全員完成！</div>
    </section>

    <section class="card">
      <div class="board-head">
        <h2>枝子連於葡萄樹 · 21天旅程</h2>
        <div class="tabs" role="tablist">
          <button class="tab active" type="button" data-view="list">列表</button>
          <button class="tab" type="button" data-view="calendar">月曆</button>
        </div>
      </div>
      <p class="hint" id="board-hint">💡 點擊圓點或日曆格子即可補打卡</p>
      <div id="board"></div>
    </section>

    <div class="status" id="status"></div>
  </main>

  <script>
    const PARTICIPANT = '{{PARTICIPANT_ID}}';
    const DEMO_MODE = {{DEMO_MODE}};
    const UNLOCKED_THROUGH = {{UNLOCKED_THROUGH}};
    const DAYS = {{DAYS_JSON}};
    const ROSTER = {{ROSTER_JSON}};

    const rowsEl = document.getElementById('member-rows');
    const checkinBtn = document.getElementById('checkin-btn');
    const messageText = document.getElementById('message-text');
    const messageRef = document.getElementById('message-ref');
    const celebrateEl = document.getElementById('celebrate');
    const boardEl = document.getElementById('board');
    const statusEl = document.getElementById('status');
    const hintEl = document.getElementById('board-hint');
    const tabs = Array.from(document.querySelectorAll('.tab'));

    let progress = {};
    let today = null;
    let activeView = 'list';

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const recordFor = (date) => progress[date] || null;
    const flag = (record, id) => !!(record && record[id]);
    const isComplete = (record) => ROSTER.every((member) => flag(record, member.id));

    const toggle = async (date) => {
      const current = flag(recordFor(date), PARTICIPANT);
      const res = await fetch('/api/checkin', {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify({ date, participant: PARTICIPANT, current_status: current })
      });
      if (!res.ok) {
        setStatus(await res.text(), 'error');
        return;
      }
      setStatus('已送出', 'ok');
      setTimeout(() => setStatus('', ''), 1200);
    };

    const renderToday = () => {
      if (!today) {
        return;
      }
      rowsEl.innerHTML = '';
      today.statuses.forEach((member) => {
        const row = document.createElement('div');
        row.className = 'member-row';

        const left = document.createElement('span');
        left.className = 'member-left';
        const dot = document.createElement('span');
        dot.className = 'member-dot';
        dot.style.background = member.accent;
        const name = document.createElement('span');
        name.className = 'member-name';
        name.textContent = member.name;
        left.append(dot, name);

        const state = document.createElement('span');
        state.className = member.done ? 'member-state done' : 'member-state';
        state.textContent = member.done ? '🍃 完成' : '寶貝緊來打卡';

        row.append(left, state);
        rowsEl.appendChild(row);
      });

      if (today.checked_in) {
        checkinBtn.textContent = today.participant.name + ' 已完成打卡 ✓';
        checkinBtn.classList.add('checked');
        checkinBtn.disabled = true;
      } else {
        checkinBtn.textContent = '點擊打卡 (' + today.participant.name + ')';
        checkinBtn.classList.remove('checked');
        checkinBtn.disabled = false;
      }

      messageText.textContent = '「' + today.message.text + '」';
      messageRef.textContent = today.message.reference ? '— ' + today.message.reference : '';
      celebrateEl.classList.toggle('hidden', !today.all_checked_in);
    };

    const refreshToday = async () => {
      const res = await fetch('/api/today?p=' + PARTICIPANT);
      if (!res.ok) {
        throw new Error('無法載入今日進度');
      }
      today = await res.json();
      renderToday();
    };

    const dayDots = (record, cls) => {
      const dots = document.createElement('span');
      dots.className = cls;
      ROSTER.forEach((member) => {
        const dot = document.createElement('span');
        if (flag(record, member.id)) {
          dot.style.background = member.accent;
        }
        dots.appendChild(dot);
      });
      return dots;
    };

    const renderList = () => {
      boardEl.className = 'board-list';
      boardEl.innerHTML = '';
      DAYS.forEach((cell) => {
        const unlocked = cell.day <= UNLOCKED_THROUGH;
        const record = recordFor(cell.date);

        const row = document.createElement('div');
        row.className = unlocked ? 'day-row' : 'day-row locked';

        const label = document.createElement('span');
        label.className = 'day-label';
        label.textContent = 'Day ' + cell.day;
        const display = document.createElement('span');
        display.className = 'day-display';
        display.textContent = cell.display;

        const node = document.createElement('button');
        node.type = 'button';
        node.className = flag(record, PARTICIPANT) ? 'day-node done' : 'day-node';
        node.title = unlocked ? '點擊補打卡' : '尚未開放';
        if (unlocked) {
          node.addEventListener('click', () => toggle(cell.date));
        }

        row.append(label, display, node, dayDots(record, 'day-dots'));

        if (isComplete(record)) {
          const grape = document.createElement('span');
          grape.className = 'day-grape';
          grape.textContent = '🍇';
          row.appendChild(grape);
        }

        boardEl.appendChild(row);
      });
    };

    const renderCalendar = () => {
      boardEl.className = 'board-calendar';
      boardEl.innerHTML = '';
      ['一', '二', '三', '四', '五', '六', '日'].forEach((day) => {
        const head = document.createElement('div');
        head.className = 'weekday';
        head.textContent = day;
        boardEl.appendChild(head);
      });
      DAYS.forEach((cell) => {
        const unlocked = cell.day <= UNLOCKED_THROUGH;
        const record = recordFor(cell.date);

        const box = document.createElement('div');
        box.className = 'day-cell';
        if (!unlocked) {
          box.classList.add('locked');
        }
        if (flag(record, PARTICIPANT)) {
          box.classList.add('done');
        }
        if (unlocked) {
          box.addEventListener('click', () => toggle(cell.date));
        }

        const num = document.createElement('span');
        num.className = 'num';
        num.textContent = cell.day;
        box.appendChild(num);

        if (isComplete(record)) {
          const grape = document.createElement('span');
          grape.textContent = '🍇';
          box.appendChild(grape);
        } else {
          box.appendChild(dayDots(record, 'cell-dots'));
        }

        boardEl.appendChild(box);
      });
    };

    const renderBoard = () => {
      if (activeView === 'calendar') {
        renderCalendar();
      } else {
        renderList();
      }
      hintEl.textContent = activeView === 'calendar'
        ? '💡 點擊日曆格子即可補打卡'
        : '💡 點擊圓點即可補打卡';
    };

    tabs.forEach((button) => {
      button.addEventListener('click', () => {
        activeView = button.dataset.view;
        tabs.forEach((tab) => tab.classList.toggle('active', tab === button));
        renderBoard();
      });
    });

    checkinBtn.addEventListener('click', () => {
      if (today && !today.checked_in) {
        toggle(today.date);
      }
    });

    const events = new EventSource('/api/events');
    events.addEventListener('progress', (event) => {
      progress = JSON.parse(event.data);
      renderBoard();
      refreshToday().catch((err) => setStatus(err.message, 'error'));
    });
    events.onerror = () => setStatus('連線中斷，自動重試中…', 'error');

    renderBoard();
    refreshToday().catch((err) => setStatus(err.message, 'error'));
  </script>
</body>
</html>
"##;
