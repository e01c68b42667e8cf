//! Embedded HTML/CSS/JS frontend for the tally web dashboard.
//!
//! The entire page is compiled into the binary as a string constant. It only
//! draws what the JSON API returns; every rule about filtering, ordering and
//! paging lives server-side.

/// The complete single-page dashboard HTML.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>tally</title>
<style>
:root {
  --bg: #0d1117;
  --surface: #161b22;
  --border: #30363d;
  --text: #e6edf3;
  --text-muted: #8b949e;
  --accent: #58a6ff;
  --green: #3fb950;
  --red: #f85149;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
  --mono: 'SF Mono', 'Cascadia Code', 'Fira Code', monospace;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body {
  background: var(--bg);
  color: var(--text);
  font-family: var(--font);
  font-size: 14px;
  line-height: 1.5;
}

.app { max-width: 1000px; margin: 0 auto; padding: 24px; }

header {
  display: flex;
  align-items: center;
  justify-content: space-between;
  margin-bottom: 24px;
  padding-bottom: 16px;
  border-bottom: 1px solid var(--border);
}
header h1 { font-size: 24px; font-weight: 600; }

.card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 16px;
  margin-bottom: 16px;
}

.grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(180px, 1fr)); gap: 16px; }
.stat .label { color: var(--text-muted); font-size: 12px; text-transform: uppercase; }
.stat .value { font-family: var(--mono); font-size: 20px; }
.status-active { color: var(--green); }
.status-invalid_configuration { color: var(--red); }

form { display: flex; flex-wrap: wrap; gap: 8px; align-items: end; }
label { display: flex; flex-direction: column; color: var(--text-muted); font-size: 12px; }
input {
  background: var(--bg);
  color: var(--text);
  border: 1px solid var(--border);
  border-radius: 4px;
  padding: 6px 8px;
  font-family: var(--mono);
}
button {
  background: var(--surface);
  color: var(--accent);
  border: 1px solid var(--border);
  border-radius: 4px;
  padding: 6px 12px;
  cursor: pointer;
}
button:disabled { color: var(--text-muted); cursor: default; }

table { width: 100%; border-collapse: collapse; }
th, td { text-align: left; padding: 8px; border-bottom: 1px solid var(--border); }
th { color: var(--text-muted); font-weight: 500; }
td { font-family: var(--mono); }
.bar { background: var(--border); border-radius: 4px; height: 6px; width: 120px; }
.bar span { display: block; background: var(--accent); border-radius: 4px; height: 6px; }

.pager { display: flex; justify-content: space-between; align-items: center; margin-top: 12px; }
#message { color: var(--red); min-height: 20px; }
</style>
</head>
<body>
<div class="app">
  <header>
    <h1>tally</h1>
    <div>
      <button id="refresh">Refresh</button>
      <button id="export">Export</button>
    </div>
  </header>

  <section class="card grid" id="counter">
    <div class="stat"><div class="label">Started</div><div class="value" id="c-start">--</div></div>
    <div class="stat"><div class="label">Now</div><div class="value" id="c-now">--</div></div>
    <div class="stat"><div class="label">Elapsed</div><div class="value" id="c-days">--</div></div>
    <div class="stat"><div class="label">Status</div><div class="value" id="c-status">--</div></div>
  </section>

  <section class="card grid">
    <div class="stat"><div class="label">Records</div><div class="value" id="s-total">-</div></div>
    <div class="stat"><div class="label">Average</div><div class="value" id="s-average">-</div></div>
    <div class="stat"><div class="label">Last record</div><div class="value" id="s-last">-</div></div>
  </section>

  <section class="card">
    <form id="filters">
      <label>Date<input name="date" placeholder="dd/mm/yyyy"></label>
      <label>Month<input name="month" placeholder="1-12" size="4"></label>
      <label>Year<input name="year" placeholder="yyyy" size="6"></label>
      <label>Duration<input name="duration" placeholder="days"></label>
      <button type="submit">Apply</button>
      <button type="button" id="reset">Reset</button>
    </form>
  </section>

  <section class="card">
    <table>
      <thead><tr><th>Date</th><th>Time</th><th>Days gone by</th><th>Progress</th></tr></thead>
      <tbody id="rows"></tbody>
    </table>
    <div class="pager">
      <button id="prev">Previous</button>
      <span id="info">No records found</span>
      <button id="next">Next</button>
    </div>
  </section>

  <div id="message"></div>
</div>

<script>
const $ = (id) => document.getElementById(id);

async function call(method, path, body) {
  const opts = { method, headers: {} };
  if (body !== undefined) {
    opts.headers['Content-Type'] = 'application/json';
    opts.body = JSON.stringify(body);
  }
  const res = await fetch(path, opts);
  const data = await res.json();
  if (!res.ok) throw new Error(data.error || res.statusText);
  return data;
}

function show(message) { $('message').textContent = message || ''; }

function cell(text) {
  const td = document.createElement('td');
  td.textContent = text;
  return td;
}

function renderView(view) {
  const body = $('rows');
  body.replaceChildren();
  for (const row of view.rows) {
    const tr = document.createElement('tr');
    tr.append(cell(row.date), cell(row.time), cell(row.days_gone_by));
    const td = document.createElement('td');
    td.innerHTML = '<div class="bar"><span></span></div>';
    td.querySelector('span').style.width = row.progress + '%';
    tr.append(td);
    body.append(tr);
  }

  const c = view.controls;
  $('info').textContent = c.info;
  $('prev').disabled = c.previous_disabled;
  $('next').disabled = c.next_disabled;

  $('s-total').textContent = view.summary.total_records;
  $('s-average').textContent = view.summary.average_duration;
  $('s-last').textContent = view.summary.last_record;

  const form = $('filters');
  for (const key of ['date', 'month', 'year', 'duration']) {
    form.elements[key].value = view.criteria[key] || '';
  }
}

async function tick() {
  try {
    const c = await call('GET', '/api/counter');
    $('c-start').textContent = c.start;
    $('c-now').textContent = c.now;
    $('c-days').textContent = c.elapsed_label;
    $('c-status').textContent = c.status === 'active' ? 'Active' : 'Invalid configuration';
    $('c-status').className = 'value status-' + c.status;
  } catch (e) {
    show(e.message);
  }
}

async function act(method, path, body) {
  try {
    renderView(await call(method, path, body));
    show('');
  } catch (e) {
    show(e.message);
  }
}

async function exportView() {
  try {
    const res = await fetch('/api/export');
    if (!res.ok) {
      const data = await res.json().catch(() => ({}));
      throw new Error(data.error || res.statusText);
    }
    const disposition = res.headers.get('Content-Disposition') || '';
    const named = /filename="([^"]+)"/.exec(disposition);
    const url = URL.createObjectURL(await res.blob());
    const link = document.createElement('a');
    link.href = url;
    link.download = named ? named[1] : 'tally-export.json';
    document.body.appendChild(link);
    link.click();
    link.remove();
    URL.revokeObjectURL(url);
    show('');
  } catch (e) {
    show(e.message);
  }
}

$('filters').addEventListener('submit', (ev) => {
  ev.preventDefault();
  const criteria = {};
  for (const [key, value] of new FormData(ev.target)) criteria[key] = value;
  act('POST', '/api/filters', criteria);
});
$('reset').addEventListener('click', () => act('POST', '/api/filters/reset'));
$('prev').addEventListener('click', () => act('POST', '/api/page/prev'));
$('next').addEventListener('click', () => act('POST', '/api/page/next'));
$('refresh').addEventListener('click', () => act('POST', '/api/refresh'));
$('export').addEventListener('click', exportView);

act('GET', '/api/view');
tick();
setInterval(tick, 1000);
</script>
</body>
</html>
"##;
