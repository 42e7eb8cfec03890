mod config_gen;
mod content;
mod demo;
mod lint;
mod setup;

use std::env;
use std::process::ExitCode;

use anyhow::Result;

use casefile_core::config::{DialogueConfig, EncounterConfig, SystemConfig};
use casefile_core::SceneState;

use crate::demo::Autopilot;

const CONFIG_PATH: &str = "config.toml";
const MAX_FRAMES: u32 = 60 * 60 * 10;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    let lint_root = args
        .iter()
        .position(|a| a == "--lint")
        .map(|i| args.get(i + 1).cloned().unwrap_or_else(|| "demos".into()));
    let skip = args.iter().any(|a| a == "--skip");
    let quiet = args.iter().any(|a| a == "--quiet");

    setup::init(CONFIG_PATH, quiet);
    log::info!(">>> Casefile Launcher Started <<<");

    let dialogue_cfg: DialogueConfig = casefile_shared::config::get("dialogue");

    if let Some(root) = lint_root {
        return match lint::lint_dir(&root, &dialogue_cfg) {
            Ok(report) if report.is_clean() => ExitCode::SUCCESS,
            Ok(report) => {
                for error in &report.errors {
                    log::error!("{}", error);
                }
                ExitCode::FAILURE
            }
            Err(e) => {
                log::error!("Lint failed: {:#}", e);
                ExitCode::FAILURE
            }
        };
    }

    let content_path = args.iter().find(|a| !a.starts_with("--")).cloned();
    match run_demo(content_path, dialogue_cfg, skip) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_demo(content_path: Option<String>, dialogue_cfg: DialogueConfig, skip: bool) -> Result<()> {
    let sys_cfg: SystemConfig = casefile_shared::config::get("system");
    let encounter_cfg: EncounterConfig = casefile_shared::config::get("encounter");
    let path = content_path.unwrap_or(sys_cfg.content_path);

    log::info!("Loading encounter from: {}", path);
    let file = content::load(&path)?;
    log::debug!(
        "Loaded {} scripts, {} topics, {} lines",
        file.scripts.len(),
        file.topics.len(),
        file.line_count()
    );

    let mut encounter = file.build(&dialogue_cfg, encounter_cfg)?;
    let mut state = match &file.encounter.partner {
        Some(partner) => SceneState::new().with_partner(partner.clone()),
        None => SceneState::new(),
    };

    let mut pilot = Autopilot::new(file.evidence_ids(), skip);
    let stats = pilot.run(&mut encounter, &mut state, sys_cfg.frame_ms.max(1), MAX_FRAMES)?;

    log::info!(
        "Demo over after {} frames ({} effects, finished: {})",
        stats.frames,
        stats.effects,
        stats.finished
    );
    Ok(())
}
