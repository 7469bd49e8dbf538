//! The host page served at `GET /`.
//!
//! A single static document with three editors, a save button, a sliding
//! history panel and the preview frame. Edits go to
//! `PUT /api/fragments/{kind}`; the server debounces, recomposes and
//! announces each new revision on `/ws/preview`, and the page swaps in a
//! fresh sandboxed frame for it.
//!
//! The page never embeds the preview in a frame without a working
//! `sandbox` attribute.

use penbox_core::isolation::IsolationBoundary;

const SANDBOX_PLACEHOLDER: &str = "__PENBOX_SANDBOX__";
const SCRIPTS_PLACEHOLDER: &str = "__PENBOX_SCRIPTS_ENABLED__";

/// Render the host page for `boundary`.
pub fn host_page(boundary: IsolationBoundary) -> String {
    let scripts_enabled = if boundary.scripts_enabled() {
        "true"
    } else {
        "false"
    };
    HOST_PAGE
        .replace(SANDBOX_PLACEHOLDER, boundary.policy().iframe_sandbox())
        .replace(SCRIPTS_PLACEHOLDER, scripts_enabled)
}

const HOST_PAGE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Penbox</title>
    <style>
        body { margin: 0; font-family: Inter, system-ui, Arial, sans-serif; }
        .topbar { display: flex; gap: 8px; align-items: center; padding: 10px 12px; border-bottom: 1px solid #eee; }
        .topbar .status { margin-left: auto; font-size: 12px; color: #777; }
        .workspace { display: grid; grid-template-columns: 1fr 1fr; gap: 12px; padding: 12px; }
        .editors { display: grid; grid-template-rows: 1fr 1fr 1fr; gap: 12px; min-height: 70vh; }
        .editor, .preview { display: flex; flex-direction: column; }
        .preview { min-height: 70vh; }
        .label { font-size: 12px; font-weight: 700; margin-bottom: 6px; }
        textarea {
            flex: 1; min-height: 0; resize: vertical; padding: 10px;
            border-radius: 8px; border: 1px solid #ddd; background: #0b0b0b; color: #fafafa;
            font-family: ui-monospace, SFMono-Regular, Menlo, Monaco, Consolas, 'Liberation Mono', 'Courier New', monospace;
            font-size: 13px; line-height: 1.5;
        }
        #frame-host { flex: 1; display: flex; }
        #frame-host iframe { flex: 1; width: 100%; border: 1px solid #ddd; border-radius: 8px; background: white; }
        .notice { padding: 10px; border-radius: 8px; background: #fff7e0; border: 1px solid #f0d68a; font-size: 13px; margin-bottom: 8px; }
        .hidden { display: none; }
        button { padding: 8px 12px; border-radius: 8px; border: 1px solid #ddd; background: #f8f8f8; cursor: pointer; font-weight: 600; }
        button.danger { background: #ffebeb; border-color: #ffb8b8; color: #c01818; }
        button.primary { background: #eef4ff; border-color: #c9d8ff; color: #1a48c2; }
        button:disabled { opacity: 0.6; cursor: default; }
        #history {
            position: fixed; top: 0; right: -420px; width: 420px; height: 100%;
            box-sizing: border-box; background: #1e1e1e; color: #fff; padding: 16px;
            box-shadow: -4px 0 12px rgba(0,0,0,0.35); transition: right 0.3s ease-in-out;
            overflow-y: auto; z-index: 1000;
        }
        #history.open { right: 0; }
        #history .head { display: flex; align-items: center; justify-content: space-between; margin-bottom: 12px; }
        #history h2 { margin: 0; font-size: 18px; }
        #history .actions { display: flex; gap: 8px; margin-bottom: 12px; }
        #history ul { list-style: none; padding: 0; margin: 0; display: grid; gap: 10px; }
        #history li { background: #2b2b2b; border-radius: 10px; padding: 12px; }
        #history .when { font-size: 12px; opacity: 0.8; margin-bottom: 8px; }
        #history .snippet-label { font-size: 11px; opacity: 0.8; margin-bottom: 4px; }
        #history pre {
            margin: 0 0 8px 0; white-space: pre-wrap; word-break: break-word; background: #1a1a1a;
            border: 1px solid #3a3a3a; border-radius: 8px; padding: 10px; font-size: 12px; line-height: 1.4;
        }
        #history .entry-actions { display: flex; gap: 8px; margin-top: 10px; }
    </style>
</head>
<body>
    <div class="topbar">
        <button id="save">Save</button>
        <button id="toggle-history">History</button>
        <span class="status" id="status">connecting...</span>
    </div>

    <div class="workspace">
        <div class="editors">
            <div class="editor">
                <div class="label">HTML</div>
                <textarea id="editor-html" data-kind="html" placeholder="<h1>Hello</h1>" spellcheck="false"></textarea>
            </div>
            <div class="editor">
                <div class="label">CSS</div>
                <textarea id="editor-css" data-kind="css" placeholder="h1 { color: tomato; }" spellcheck="false"></textarea>
            </div>
            <div class="editor">
                <div class="label">JS</div>
                <textarea id="editor-js" data-kind="js" placeholder="console.log('Hello from JS')" spellcheck="false"></textarea>
            </div>
        </div>

        <div class="preview">
            <div class="label">Preview</div>
            <div id="scripts-notice" class="notice hidden">
                Scripts are disabled: preview isolation is unavailable, so the JS editor has no effect.
            </div>
            <div id="sandbox-notice" class="notice hidden">
                This browser does not support sandboxed frames. The preview is not shown.
            </div>
            <div id="frame-host"></div>
        </div>
    </div>

    <div id="history">
        <div class="head">
            <h2>History</h2>
            <button id="close-history" class="danger">Close</button>
        </div>
        <div class="actions">
            <button id="refresh-history">Refresh</button>
            <button id="clear-history" class="danger">Clear All</button>
        </div>
        <p id="history-empty">No history yet. Click "Save" to create your first snapshot.</p>
        <ul id="history-list"></ul>
    </div>

    <script>
    (function () {
        'use strict';

        const SANDBOX = '__PENBOX_SANDBOX__';
        const SCRIPTS_ENABLED = __PENBOX_SCRIPTS_ENABLED__;
        const KINDS = ['html', 'css', 'js'];

        const $ = (id) => document.getElementById(id);
        const editors = {};
        KINDS.forEach((kind) => { editors[kind] = $('editor-' + kind); });

        // Sandbox support: never embed the preview without it.
        const sandboxSupported = 'sandbox' in document.createElement('iframe');
        if (!sandboxSupported) {
            $('sandbox-notice').classList.remove('hidden');
        }
        if (!SCRIPTS_ENABLED) {
            $('scripts-notice').classList.remove('hidden');
        }

        let shownRevision = -1;

        function showRevision(revision) {
            if (!sandboxSupported || revision === shownRevision) {
                return;
            }
            shownRevision = revision;
            // A fresh frame per revision: nothing from the previous run survives.
            const frame = document.createElement('iframe');
            frame.setAttribute('sandbox', SANDBOX);
            frame.setAttribute('referrerpolicy', 'no-referrer');
            frame.title = 'preview';
            frame.src = '/preview/' + revision;
            $('frame-host').replaceChildren(frame);
        }

        // ---- Editing ----------------------------------------------------

        const pending = {};
        KINDS.forEach((kind) => { pending[kind] = Promise.resolve(); });

        function pushFragment(kind) {
            const text = editors[kind].value;
            pending[kind] = pending[kind]
                .then(() => fetch('/api/fragments/' + kind, {
                    method: 'PUT',
                    headers: { 'content-type': 'text/plain; charset=utf-8' },
                    body: text,
                }))
                .catch((err) => console.error('Failed to send edit:', err));
        }

        KINDS.forEach((kind) => {
            editors[kind].addEventListener('input', () => pushFragment(kind));
        });

        function flushEdits() {
            return Promise.all(KINDS.map((kind) => pending[kind]));
        }

        function fillEditors(fragments) {
            KINDS.forEach((kind) => { editors[kind].value = fragments[kind] || ''; });
        }

        async function loadFragments() {
            const res = await fetch('/api/fragments');
            if (!res.ok) {
                throw new Error('HTTP ' + res.status);
            }
            const body = await res.json();
            fillEditors(body);
            showRevision(body.revision);
        }

        // ---- History ----------------------------------------------------

        let history = [];

        function renderHistory() {
            const list = $('history-list');
            list.replaceChildren();
            $('history-empty').classList.toggle('hidden', history.length > 0);

            history.forEach((item) => {
                const li = document.createElement('li');

                const when = document.createElement('div');
                when.className = 'when';
                const created = new Date(item.created_at);
                when.textContent = isNaN(created.getTime()) ? 'Pending timestamp' : created.toLocaleString();
                li.appendChild(when);

                [['HTML', item.html], ['CSS', item.css], ['JS', item.js]].forEach(([label, text]) => {
                    const name = document.createElement('div');
                    name.className = 'snippet-label';
                    name.textContent = label;
                    const pre = document.createElement('pre');
                    pre.textContent = text;
                    li.appendChild(name);
                    li.appendChild(pre);
                });

                const actions = document.createElement('div');
                actions.className = 'entry-actions';
                const load = document.createElement('button');
                load.className = 'primary';
                load.textContent = 'Load';
                load.addEventListener('click', () => loadEntry(item.id));
                const del = document.createElement('button');
                del.className = 'danger';
                del.textContent = 'Delete';
                del.addEventListener('click', () => deleteEntry(item.id));
                actions.appendChild(load);
                actions.appendChild(del);
                li.appendChild(actions);

                list.appendChild(li);
            });
        }

        async function loadHistory() {
            try {
                const res = await fetch('/api/snapshots');
                if (!res.ok) {
                    throw new Error('HTTP ' + res.status);
                }
                history = (await res.json()).snapshots;
                renderHistory();
            } catch (err) {
                console.error('Error loading history:', err);
                alert('Failed to load history. Check the snapshot store connection.');
            }
        }

        async function saveCurrent() {
            const button = $('save');
            button.disabled = true;
            button.textContent = 'Saving...';
            try {
                await flushEdits();
                const res = await fetch('/api/snapshots', { method: 'POST' });
                if (!res.ok) {
                    throw new Error('HTTP ' + res.status);
                }
                await loadHistory();
                alert('Saved.');
            } catch (err) {
                console.error('Error saving:', err);
                alert('Save failed. Check the snapshot store connection.');
            } finally {
                button.disabled = false;
                button.textContent = 'Save';
            }
        }

        async function loadEntry(id) {
            try {
                const res = await fetch('/api/snapshots/' + id + '/load', { method: 'POST' });
                if (!res.ok) {
                    throw new Error('HTTP ' + res.status);
                }
                fillEditors((await res.json()).fragments);
            } catch (err) {
                console.error('Error loading snapshot:', err);
                alert('Load failed.');
            }
        }

        async function deleteEntry(id) {
            if (!window.confirm('Delete this entry permanently?')) {
                return;
            }
            try {
                const res = await fetch('/api/snapshots/' + id, { method: 'DELETE' });
                if (!res.ok) {
                    throw new Error('HTTP ' + res.status);
                }
                await loadHistory();
            } catch (err) {
                console.error('Error deleting:', err);
                alert('Delete failed.');
            }
        }

        async function clearAll() {
            if (!window.confirm('Delete ALL history entries? This cannot be undone.')) {
                return;
            }
            const button = $('clear-history');
            button.disabled = true;
            button.textContent = 'Clearing...';
            try {
                const res = await fetch('/api/snapshots', { method: 'DELETE' });
                const body = await res.json();
                if (!res.ok) {
                    const counts = body.failed !== undefined
                        ? ' (' + body.deleted + ' deleted, ' + body.failed + ' failed)'
                        : '';
                    throw new Error(body.error + counts);
                }
                history = [];
                renderHistory();
            } catch (err) {
                console.error('Error clearing history:', err);
                alert('Failed to clear history. ' + err.message);
            } finally {
                button.disabled = false;
                button.textContent = 'Clear All';
            }
        }

        $('save').addEventListener('click', saveCurrent);
        $('toggle-history').addEventListener('click', () => $('history').classList.toggle('open'));
        $('close-history').addEventListener('click', () => $('history').classList.remove('open'));
        $('refresh-history').addEventListener('click', loadHistory);
        $('clear-history').addEventListener('click', clearAll);

        // ---- Revision stream -------------------------------------------

        function connect() {
            const scheme = location.protocol === 'https:' ? 'wss://' : 'ws://';
            const socket = new WebSocket(scheme + location.host + '/ws/preview');
            socket.addEventListener('open', () => { $('status').textContent = 'live'; });
            socket.addEventListener('message', (event) => {
                try {
                    const update = JSON.parse(event.data);
                    showRevision(update.revision);
                } catch (err) {
                    console.error('Bad preview update:', err);
                }
            });
            socket.addEventListener('close', () => {
                $('status').textContent = 'reconnecting...';
                setTimeout(connect, 1000);
            });
        }

        loadFragments().catch((err) => console.error('Error loading fragments:', err));
        loadHistory();
        connect();
    })();
    </script>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_filled() {
        let page = host_page(IsolationBoundary::sandboxed());
        assert!(!page.contains(SANDBOX_PLACEHOLDER));
        assert!(!page.contains(SCRIPTS_PLACEHOLDER));
        assert!(page.contains("const SANDBOX = 'allow-scripts';"));
        assert!(page.contains("const SCRIPTS_ENABLED = true;"));
    }

    #[test]
    fn scripts_disabled_page_locks_the_frame() {
        let page = host_page(IsolationBoundary::scripts_disabled());
        assert!(page.contains("const SANDBOX = '';"));
        assert!(page.contains("const SCRIPTS_ENABLED = false;"));
    }

    #[test]
    fn page_never_grants_same_origin() {
        for boundary in [
            IsolationBoundary::sandboxed(),
            IsolationBoundary::scripts_disabled(),
        ] {
            assert!(!host_page(boundary).contains("allow-same-origin"));
        }
    }
}
