use std::path::PathBuf;
use std::sync::Arc;
use std::{env, fs};

use ai_client::OllamaClientConfig;
use backend_api::{AppState, run_server};
use store::JsonFileStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if any) before reading configuration.
    dotenvy::dotenv().ok();

    // settings.json provides defaults; environment variables win.
    let settings_path = env::var("SETTINGS_PATH").ok().map(PathBuf::from);
    let settings = settings_loader::load_settings_with_fallback(settings_path.as_ref());

    let database_path_raw =
        env::var("DATABASE_PATH").unwrap_or_else(|_| settings.database_path_or_default());
    let host = env::var("HOST").unwrap_or_else(|_| settings.host_or_default());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(|| settings.port_or_default());

    // Resolve a relative database path against the workspace root so the
    // server can be started from any member directory.
    let crate_root = env::current_dir()?;
    let workspace_root = find_workspace_root().unwrap_or_else(|| crate_root.clone());
    let database_path = resolve_with_fallback(&database_path_raw, &[&workspace_root, &crate_root]);

    println!("Momentum Insights API Server");
    println!("============================");
    println!("Database path (resolved): {}", database_path.display());
    println!("Listening on: {}:{}", host, port);
    println!("Environment overrides: DATABASE_PATH='{}'", database_path_raw);
    println!();

    let store = JsonFileStore::new(&database_path);
    store.ensure_exists()?;

    let state = AppState::new(Arc::new(store), OllamaClientConfig::from_env());
    run_server(state, &host, port).await?;

    Ok(())
}

/// Find the Cargo workspace root by traversing up until a Cargo.toml that contains a [workspace] section.
fn find_workspace_root() -> Option<PathBuf> {
    let mut dir = env::current_dir().ok()?;
    for _ in 0..10 {
        // safety limit
        let candidate = dir.join("Cargo.toml");
        if candidate.exists() {
            if let Ok(content) = fs::read_to_string(&candidate) {
                if content.contains("[workspace]") {
                    return Some(dir.clone());
                }
            }
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

/// Resolve a raw path string against a list of base directories, returning the first existing match, or the first constructed path.
fn resolve_with_fallback(raw: &str, bases: &[&PathBuf]) -> PathBuf {
    let input = PathBuf::from(raw);
    if input.is_absolute() {
        return input;
    }
    for base in bases {
        let candidate = base.join(&input);
        if candidate.exists() {
            return candidate;
        }
    }
    // If none exist yet (maybe will be created later), just use the first base.
    match bases.first() {
        Some(base) => base.join(input),
        None => input,
    }
}
