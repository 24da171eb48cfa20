use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use htmlescape::{encode_attribute, encode_minimal};
use indoc::{formatdoc, indoc};

use crate::config::CatalogConfig;
use crate::store::Snapshot;

const STYLE: &str = indoc! {"
    * { margin: 0; padding: 0; box-sizing: border-box; }
    body { background: linear-gradient(135deg, #1a0033 0%, #330066 100%); font-family: -apple-system, 'Segoe UI', Arial, sans-serif; color: #fff; min-height: 100vh; }
    .header { background: #000; padding: 15px 20px; display: flex; justify-content: space-between; align-items: center; border-bottom: 3px solid #d946ef; }
    .logo { font-size: 24px; font-weight: bold; }
    .buttons { display: flex; gap: 10px; }
    .button { background: #d946ef; color: #fff; padding: 10px 20px; border-radius: 8px; border: none; font-weight: bold; text-decoration: none; cursor: pointer; }
    .button.refresh { background: #4ade80; }
    .info { background: rgba(0, 0, 0, 0.5); padding: 10px 20px; text-align: center; color: #d946ef; font-size: 13px; }
    .grid { max-width: 1200px; margin: 0 auto; padding: 20px; display: grid; grid-template-columns: repeat(auto-fill, minmax(280px, 1fr)); gap: 15px; }
    .card { background: rgba(0, 0, 0, 0.6); border: 2px solid #333; border-radius: 15px; padding: 20px; text-align: center; }
    .card img { width: 100px; margin-bottom: 15px; }
    .title { font-size: 18px; font-weight: bold; color: #d946ef; margin-bottom: 12px; }
    .online { color: #4ade80; font-size: 13px; font-weight: bold; margin-bottom: 15px; }
    .watch { display: block; margin-bottom: 8px; }
    .copy { width: 100%; background: rgba(255, 255, 255, 0.1); color: #d946ef; padding: 12px; border-radius: 10px; border: 1px solid #d946ef; cursor: pointer; }
    #toast { position: fixed; bottom: 30px; left: 50%; transform: translateX(-50%); background: #d946ef; padding: 15px 30px; border-radius: 10px; display: none; }
"};

const SCRIPT: &str = indoc! {"
    function showToast(message) {
        const toast = document.getElementById('toast');
        toast.textContent = message;
        toast.style.display = 'block';
        setTimeout(() => { toast.style.display = 'none'; }, 2500);
    }

    async function copyLink(link) {
        try {
            await navigator.clipboard.writeText(link);
            showToast('✓ Link copiado!');
        } catch (err) {
            showToast('Erro ao copiar: ' + err);
        }
    }

    async function forceRefresh() {
        showToast('🔄 Atualizando canais...');
        try {
            await fetch('/atualizar-canais');
            setTimeout(() => location.reload(), 2000);
        } catch (err) {
            showToast('❌ Erro ao atualizar');
        }
    }

    setInterval(async () => {
        try {
            const stats = await (await fetch('/stats')).json();
            for (const [index, count] of Object.entries(stats)) {
                const element = document.getElementById('count-' + index);
                if (element) {
                    element.textContent = count + ' ON';
                }
            }
        } catch (err) {}
    }, 3000);
"};

/// Renders the channel catalog.
pub fn catalog(
    config: &CatalogConfig,
    snapshot: &Snapshot,
    counts: &BTreeMap<usize, usize>,
    base_url: &str,
) -> String {
    let mut cards = String::new();

    for (index, channel) in snapshot.channels.iter().enumerate() {
        let logo = config
            .logo_url
            .as_deref()
            .map(|url| format!(r#"<img src="{}" alt="">"#, encode_attribute(url)))
            .unwrap_or_default();
        let count = counts.get(&index).copied().unwrap_or_default();
        let link = copy_link_argument(&format!("{base_url}/stream/{index}"));

        cards.push_str(&format!(
            r#"
            <div class="card">
                {logo}
                <div class="title">{name}</div>
                <div class="online"><span id="count-{index}">{count} ON</span></div>
                <a href="/stream/{index}" target="_blank" class="button watch">▶️ ASSISTIR</a>
                <button onclick="copyLink({link})" class="copy">📋 COPIAR LINK</button>
            </div>"#,
            name = encode_minimal(&channel.name),
        ));
    }

    formatdoc! {r#"
        <!DOCTYPE html>
        <html lang="pt-br">
        <head>
            <meta charset="UTF-8">
            <meta name="viewport" content="width=device-width, initial-scale=1.0">
            <title>{title}</title>
            <style>
        {STYLE}
            </style>
        </head>
        <body>
            <div class="header">
                <div class="logo">📺 {title}</div>
                <div class="buttons">
                    <button onclick="forceRefresh()" class="button refresh">🔄 ATUALIZAR</button>
                    <a href="/baixar-m3u" class="button">📥 M3U</a>
                </div>
            </div>
            <div class="info">📡 {count} canais disponíveis • Última atualização: {refreshed_at}</div>
            <div class="grid">{cards}
            </div>
            <div id="toast"></div>
            <script>
        {SCRIPT}
            </script>
        </body>
        </html>
        "#,
        title = encode_minimal(&config.title),
        count = snapshot.len(),
        refreshed_at = refreshed_at(snapshot.refreshed_at),
    }
}

/// Renders the page shown for a channel that has no stream assigned yet.
pub fn not_ready(name: &str) -> String {
    formatdoc! {r#"
        <!DOCTYPE html>
        <html>
        <head>
            <meta charset="UTF-8">
            <title>Canal em Configuração</title>
            <style>
                body {{ font-family: Arial; text-align: center; padding: 50px; background: #1a0033; color: #d946ef; }}
                button {{ background: #d946ef; color: #fff; padding: 15px 30px; border: none; border-radius: 10px; margin-top: 20px; cursor: pointer; }}
            </style>
        </head>
        <body>
            <h1>⚙️ Canal em Configuração</h1>
            <p>O link M3U8 para <strong>{name}</strong> ainda não foi configurado.</p>
            <button onclick="history.back()">⬅️ Voltar</button>
        </body>
        </html>
        "#,
        name = encode_minimal(name),
    }
}

fn refreshed_at(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|at| at.format("%d/%m/%Y %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "Aguardando...".to_string())
}

/// The link as a JavaScript string literal, encoded for use inside an HTML attribute.
///
/// The browser decodes the attribute before running the handler, so the literal itself must
/// be safe JavaScript.
fn copy_link_argument(link: &str) -> String {
    let literal = serde_json::Value::from(link).to_string();

    encode_attribute(&literal)
}
