pub fn render_index() -> &'static str {
    INDEX_HTML
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Oura Dashboard</title>
  <style>
    :root {
      --bg-1: #1a1a2e;
      --bg-2: #16213e;
      --ink: #f3f4f6;
      --muted: #a1a1aa;
      --card: rgba(255, 255, 255, 0.05);
      --line: rgba(55, 65, 81, 0.5);
      --sleep: #6366f1;
      --readiness: #10b981;
      --activity: #f59e0b;
      --danger: #f87171;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(160deg, var(--bg-1), var(--bg-2) 70%);
      color: var(--ink);
      font-family: "Segoe UI", "Helvetica Neue", Arial, sans-serif;
      padding: 32px 18px 48px;
      display: grid;
      justify-items: center;
    }

    .app {
      width: min(960px, 100%);
      display: grid;
      gap: 24px;
    }

    header h1 {
      margin: 0;
      font-size: clamp(1.8rem, 4vw, 2.4rem);
      font-weight: 600;
    }

    header p {
      margin: 4px 0 0;
      color: var(--muted);
    }

    .card {
      background: var(--card);
      border: 1px solid rgba(255, 255, 255, 0.08);
      border-radius: 16px;
      padding: 22px;
    }

    #token-setup {
      display: grid;
      gap: 12px;
      max-width: 520px;
    }

    #token-setup label {
      color: var(--muted);
      font-size: 0.9rem;
    }

    #token-setup input {
      background: rgba(0, 0, 0, 0.35);
      border: 1px solid var(--line);
      border-radius: 10px;
      color: var(--ink);
      padding: 10px 12px;
      font-size: 1rem;
    }

    button {
      background: var(--sleep);
      border: none;
      border-radius: 10px;
      color: white;
      cursor: pointer;
      font-size: 0.95rem;
      padding: 10px 16px;
    }

    button.ghost {
      background: transparent;
      border: 1px solid var(--line);
      color: var(--muted);
    }

    #date-navigation {
      display: flex;
      align-items: center;
      gap: 12px;
      flex-wrap: wrap;
    }

    #date-navigation input {
      background: rgba(0, 0, 0, 0.35);
      border: 1px solid var(--line);
      border-radius: 10px;
      color: var(--ink);
      padding: 8px 10px;
    }

    #date-display {
      font-weight: 600;
    }

    .grid {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
      gap: 16px;
    }

    .metric-card h2 {
      margin: 0 0 6px;
      font-size: 0.85rem;
      font-weight: 500;
      letter-spacing: 0.1em;
      text-transform: uppercase;
      color: var(--muted);
    }

    .score {
      font-size: 2.4rem;
      font-weight: 600;
      margin: 0 0 10px;
    }

    .metric-card[data-kind="sleep"] .score { color: var(--sleep); }
    .metric-card[data-kind="readiness"] .score { color: var(--readiness); }
    .metric-card[data-kind="activity"] .score { color: var(--activity); }

    .sub {
      display: flex;
      justify-content: space-between;
      color: var(--muted);
      font-size: 0.88rem;
      padding: 3px 0;
    }

    .sub span:last-child {
      color: var(--ink);
    }

    .legend {
      display: flex;
      gap: 18px;
      margin-bottom: 10px;
      color: var(--muted);
      font-size: 0.85rem;
    }

    .legend i {
      display: inline-block;
      width: 10px;
      height: 10px;
      border-radius: 50%;
      margin-right: 6px;
    }

    .chart-grid {
      stroke: var(--line);
      stroke-width: 1;
    }

    .chart-label {
      fill: var(--muted);
      font-size: 11px;
    }

    .chart-line {
      fill: none;
      stroke-width: 2.5;
      stroke-linejoin: round;
      stroke-linecap: round;
    }

    .chart-point {
      stroke: var(--bg-2);
      stroke-width: 1.5;
    }

    #loading, #error {
      text-align: center;
      color: var(--muted);
    }

    #error {
      color: var(--danger);
      display: grid;
      gap: 12px;
      justify-items: center;
    }

    .hidden {
      display: none !important;
    }
  </style>
</head>
<body>
  <div class="app">
    <header>
      <h1>Oura Dashboard</h1>
      <p>Sleep, readiness, and activity from your ring.</p>
    </header>

    <section id="token-setup" class="card hidden">
      <label for="api-token">Personal access token</label>
      <input id="api-token" type="password" placeholder="Paste your Oura API token" autocomplete="off" />
      <button id="save-token">Connect</button>
      <p id="token-status"></p>
    </section>

    <section id="date-navigation" class="card hidden">
      <button id="prev-day" class="ghost">&#8592;</button>
      <input id="selected-date" type="date" />
      <button id="next-day" class="ghost">&#8594;</button>
      <span id="date-display"></span>
      <span style="flex:1"></span>
      <button id="sign-out" class="ghost">Sign out</button>
    </section>

    <section id="dashboard" class="hidden">
      <div class="grid">
        <div class="card metric-card" data-kind="sleep">
          <h2>Sleep</h2>
          <p class="score" id="sleep-score">--</p>
          <div class="sub"><span>Duration</span><span id="sleep-duration">--</span></div>
          <div class="sub"><span>Efficiency</span><span id="sleep-efficiency">--</span></div>
          <div class="sub"><span>Latency</span><span id="sleep-latency">--</span></div>
        </div>
        <div class="card metric-card" data-kind="readiness">
          <h2>Readiness</h2>
          <p class="score" id="readiness-score">--</p>
          <div class="sub"><span>HRV balance</span><span id="hrv-balance">--</span></div>
          <div class="sub"><span>Recovery index</span><span id="recovery-index">--</span></div>
          <div class="sub"><span>Resting HR</span><span id="resting-hr">--</span></div>
        </div>
        <div class="card metric-card" data-kind="activity">
          <h2>Activity</h2>
          <p class="score" id="activity-score">--</p>
          <div class="sub"><span>Steps</span><span id="steps">--</span></div>
          <div class="sub"><span>Calories</span><span id="calories">--</span></div>
          <div class="sub"><span>Active calories</span><span id="active-calories">--</span></div>
        </div>
      </div>
    </section>

    <section id="charts-section" class="card hidden">
      <div class="legend">
        <span><i style="background: var(--sleep)"></i>Sleep</span>
        <span><i style="background: var(--readiness)"></i>Readiness</span>
        <span><i style="background: var(--activity)"></i>Activity</span>
      </div>
      <svg id="trends-chart" viewBox="0 0 640 280" role="img" aria-label="7-day score trends"></svg>
    </section>

    <p id="loading" class="hidden">Loading...</p>

    <section id="error" class="card hidden">
      <p id="error-message"></p>
      <button id="retry-btn">Retry</button>
    </section>
  </div>

  <script>
    const el = (id) => document.getElementById(id);
    const show = (id) => el(id).classList.remove('hidden');
    const hide = (id) => el(id).classList.add('hidden');

    let selectedDate = new Date().toISOString().split('T')[0];

    const fetchJson = async (url, options) => {
      let res;
      try {
        res = await fetch(url, options);
      } catch (err) {
        throw new Error('Network error: unable to reach the dashboard server.');
      }
      if (!res.ok) {
        let message = 'Request failed (' + res.status + ')';
        try {
          const body = await res.json();
          if (body.error) {
            message = body.error + (body.details ? ': ' + body.details : '');
          }
        } catch (err) {
          // keep the status-based message
        }
        throw new Error(message);
      }
      return res.json();
    };

    const setText = (id, value) => {
      el(id).textContent = (value === null || value === undefined || value === '') ? '--' : value;
    };

    const formatDuration = (seconds) => {
      if (!seconds) return '--';
      const hours = Math.floor(seconds / 3600);
      const minutes = Math.floor((seconds % 3600) / 60);
      return hours + 'h ' + minutes + 'm';
    };

    const formatNumber = (num) => (num || num === 0) ? num.toLocaleString() : '--';

    const showTokenSetup = () => {
      show('token-setup');
      hide('dashboard');
      hide('date-navigation');
      hide('charts-section');
      hide('loading');
      hide('error');
    };

    const showDashboard = () => {
      hide('token-setup');
      show('dashboard');
      show('date-navigation');
      show('charts-section');
      hide('error');
    };

    const showError = (message) => {
      el('error-message').textContent = message;
      show('error');
      hide('loading');
    };

    const renderDay = (bundle) => {
      const sleep = bundle.sleep || {};
      setText('sleep-score', sleep.score);
      setText('sleep-duration', formatDuration(sleep.total_sleep_duration));
      setText('sleep-efficiency', sleep.efficiency ? sleep.efficiency + '%' : '--');
      setText('sleep-latency', sleep.latency ? Math.round(sleep.latency / 60) + 'm' : '--');

      const readiness = bundle.readiness || {};
      const contributors = readiness.contributors || {};
      setText('readiness-score', readiness.score);
      setText('hrv-balance', contributors.hrv_balance);
      setText('recovery-index', contributors.recovery_index);
      setText('resting-hr', contributors.resting_heart_rate);

      const activity = bundle.activity || {};
      setText('activity-score', activity.score);
      setText('steps', formatNumber(activity.steps));
      setText('calories', formatNumber(activity.total_calories));
      setText('active-calories', formatNumber(activity.active_calories));
    };

    const renderTrendChart = (series) => {
      const svg = el('trends-chart');
      if (!series.labels.length) {
        svg.innerHTML = '<text class="chart-label" x="50%" y="50%" text-anchor="middle">No data yet</text>';
        return;
      }

      const width = 640;
      const height = 280;
      const paddingX = 44;
      const paddingY = 34;
      const top = 18;

      const count = series.labels.length;
      const xStep = count > 1 ? (width - paddingX * 2) / (count - 1) : 0;
      const x = (index) => paddingX + index * xStep;
      const y = (value) => height - paddingY - (value / 100) * (height - top - paddingY);

      let grid = '';
      for (let value = 0; value <= 100; value += 25) {
        const yPos = y(value);
        grid += '<line class="chart-grid" x1="' + paddingX + '" y1="' + yPos +
          '" x2="' + (width - paddingX) + '" y2="' + yPos + '" />';
        grid += '<text class="chart-label" x="' + (paddingX - 10) + '" y="' + (yPos + 4) +
          '" text-anchor="end">' + value + '</text>';
      }

      const labelEvery = count > 8 ? 2 : 1;
      const xLabels = series.labels.map((label, index) => {
        if (index % labelEvery !== 0) return '';
        return '<text class="chart-label" x="' + x(index) + '" y="' + (height - paddingY + 18) +
          '" text-anchor="middle">' + label.slice(5) + '</text>';
      }).join('');

      const linePath = (values) => {
        let path = '';
        let pen = false;
        values.forEach((value, index) => {
          if (value === null || value === undefined) {
            pen = false;
            return;
          }
          path += (pen ? ' L ' : ' M ') + x(index).toFixed(2) + ' ' + y(value).toFixed(2);
          pen = true;
        });
        return path;
      };

      const points = (values, color) => values.map((value, index) => {
        if (value === null || value === undefined) return '';
        return '<circle class="chart-point" cx="' + x(index) + '" cy="' + y(value) +
          '" r="3.5" fill="' + color + '" />';
      }).join('');

      const lines = [
        ['sleep', 'var(--sleep)'],
        ['readiness', 'var(--readiness)'],
        ['activity', 'var(--activity)']
      ].map(([key, color]) =>
        '<path class="chart-line" stroke="' + color + '" d="' + linePath(series[key]) + '" />' +
        points(series[key], color)
      ).join('');

      svg.innerHTML = grid + xLabels + lines;
    };

    const updateDateDisplay = () => {
      el('selected-date').value = selectedDate;
      const today = new Date().toISOString().split('T')[0];
      if (selectedDate === today) {
        el('date-display').textContent = 'Today';
      } else {
        el('date-display').textContent = new Date(selectedDate + 'T00:00:00')
          .toLocaleDateString('en-US', { weekday: 'long', month: 'long', day: 'numeric' });
      }
    };

    const loadDay = async (date) => {
      show('loading');
      hide('error');
      try {
        const bundle = await fetchJson('/api/daily?date=' + date);
        renderDay(bundle);
        hide('loading');
      } catch (err) {
        showError('Failed to load data for ' + date + ': ' + err.message);
      }
    };

    const loadTrends = async () => {
      try {
        const trends = await fetchJson('/api/trends?days=7');
        renderTrendChart(trends.series);
      } catch (err) {
        showError('Failed to load trends: ' + err.message);
      }
    };

    const refresh = () => {
      updateDateDisplay();
      loadDay(selectedDate);
      loadTrends();
    };

    const navigateDate = (offset) => {
      const date = new Date(selectedDate + 'T00:00:00');
      date.setDate(date.getDate() + offset);
      selectedDate = date.toISOString().split('T')[0];
      updateDateDisplay();
      loadDay(selectedDate);
    };

    const saveToken = async () => {
      const input = el('api-token');
      const token = input.value.trim();
      if (!token) {
        el('token-status').textContent = 'Please enter your Oura API token.';
        return;
      }
      el('token-status').textContent = 'Checking token...';
      try {
        await fetchJson('/api/token', {
          method: 'POST',
          headers: { 'content-type': 'application/json' },
          body: JSON.stringify({ token })
        });
        input.value = '';
        el('token-status').textContent = '';
        showDashboard();
        refresh();
      } catch (err) {
        el('token-status').textContent = err.message;
      }
    };

    const signOut = async () => {
      try {
        await fetchJson('/api/token', { method: 'DELETE' });
      } catch (err) {
        // already signed out as far as the UI is concerned
      }
      showTokenSetup();
    };

    el('save-token').addEventListener('click', saveToken);
    el('api-token').addEventListener('keypress', (event) => {
      if (event.key === 'Enter') saveToken();
    });
    el('prev-day').addEventListener('click', () => navigateDate(-1));
    el('next-day').addEventListener('click', () => navigateDate(1));
    el('selected-date').addEventListener('change', (event) => {
      selectedDate = event.target.value;
      updateDateDisplay();
      loadDay(selectedDate);
    });
    el('retry-btn').addEventListener('click', refresh);
    el('sign-out').addEventListener('click', signOut);

    fetchJson('/api/token')
      .then((status) => {
        if (status.has_token) {
          showDashboard();
          refresh();
        } else {
          showTokenSetup();
        }
      })
      .catch(() => showTokenSetup());
  </script>
</body>
</html>
"#;
