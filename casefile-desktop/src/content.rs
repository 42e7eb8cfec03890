//! Encounter content files.
//!
//! One TOML file describes a whole encounter: its scripts (as lists of
//! dialogue lines), the topics that lead to them and the court record.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use rustc_hash::FxHashMap;
use serde::Deserialize;

use casefile_core::config::{DialogueConfig, EncounterConfig};
use casefile_core::encounter::{
    Encounter, EncounterBuilder, LineScript, ProfileSet, ScriptId, ScriptRequest, Step, Topic,
};
use casefile_core::DialogueBox;
use casefile_ui::widgets::EvidenceEntry;

const DEFAULT_HOLD_MS: u32 = 400;

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ending {
    PresentEvidence,
    EndEncounter,
    RedirectToWrongEvidence,
    ExitEarly,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LineDef {
    Plain(String),
    Voiced { text: String, voice: String },
}

#[derive(Debug, Deserialize)]
pub struct ScriptDef {
    pub id: String,
    #[serde(default)]
    pub lines: Vec<LineDef>,
    pub hold_ms: Option<u32>,
    #[serde(default)]
    pub set_flags: Vec<String>,
    pub then: Option<Ending>,
}

#[derive(Debug, Deserialize)]
pub struct TopicDef {
    pub id: String,
    pub label: String,
    pub script: String,
    pub unlock_flag: Option<String>,
    #[serde(default)]
    pub hide_when_completed: bool,
    pub partner: Option<String>,
    pub wrong_evidence: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EvidenceDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub profile: bool,
    pub script: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EncounterDef {
    pub initial_script: Option<String>,
    pub initial_lock_flag: Option<String>,
    pub wrong_evidence: Option<String>,
    pub wrong_profile: Option<String>,
    /// Partner present when the encounter starts.
    pub partner: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContentFile {
    #[serde(default)]
    pub encounter: EncounterDef,
    #[serde(default, rename = "script")]
    pub scripts: Vec<ScriptDef>,
    #[serde(default, rename = "topic")]
    pub topics: Vec<TopicDef>,
    #[serde(default)]
    pub evidence: Vec<EvidenceDef>,
}

pub fn load(path: impl AsRef<Path>) -> Result<ContentFile> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read content file: {:?}", path))?;
    parse(&raw).with_context(|| format!("Invalid content file: {:?}", path))
}

pub fn parse(raw: &str) -> Result<ContentFile> {
    Ok(toml::from_str(raw)?)
}

impl ScriptDef {
    fn to_script(&self, dialogue: &DialogueConfig) -> Result<LineScript> {
        let mut script = LineScript::new(self.hold_ms.unwrap_or(DEFAULT_HOLD_MS));
        for (n, line) in self.lines.iter().enumerate() {
            let (text, voice) = match line {
                LineDef::Plain(text) => (text.as_str(), None),
                LineDef::Voiced { text, voice } => (text.as_str(), Some(voice)),
            };
            let mut unit = DialogueBox::from_markup(text, dialogue)
                .with_context(|| format!("line {}", n + 1))?;
            if let Some(voice) = voice {
                unit = unit.with_voice(voice.clone());
            }
            script = script.line(unit);
        }
        for flag in &self.set_flags {
            script = script.set_flag(flag.clone());
        }
        Ok(match self.then {
            Some(Ending::PresentEvidence) => script.request(ScriptRequest::PresentEvidence),
            Some(Ending::EndEncounter) => script.request(ScriptRequest::EndEncounter),
            Some(Ending::RedirectToWrongEvidence) => script.step(Step::RedirectToWrongEvidence),
            Some(Ending::ExitEarly) => script.step(Step::ExitEarly),
            None => script,
        })
    }
}

impl ContentFile {
    pub fn line_count(&self) -> usize {
        self.scripts.iter().map(|s| s.lines.len()).sum()
    }

    pub fn evidence_ids(&self) -> Vec<String> {
        self.evidence.iter().map(|e| e.id.clone()).collect()
    }

    pub fn build(&self, dialogue: &DialogueConfig, config: EncounterConfig) -> Result<Encounter> {
        let mut builder = EncounterBuilder::new(config);
        let mut ids: FxHashMap<&str, ScriptId> = FxHashMap::default();
        for def in &self.scripts {
            let script = def
                .to_script(dialogue)
                .with_context(|| format!("script '{}'", def.id))?;
            if ids.insert(def.id.as_str(), builder.add_script(script)).is_some() {
                bail!("duplicate script id '{}'", def.id);
            }
        }
        let lookup = |name: &str| {
            ids.get(name)
                .copied()
                .with_context(|| format!("unknown script '{}'", name))
        };

        for def in &self.topics {
            let mut topic = Topic::new(def.id.as_str(), def.label.as_str(), lookup(&def.script)?);
            topic.unlock_flag = def.unlock_flag.clone();
            topic.hide_when_completed = def.hide_when_completed;
            topic.required_partner = def.partner.clone();
            if let Some(name) = &def.wrong_evidence {
                topic = topic.with_wrong_evidence(lookup(name)?);
            }
            builder.topic(topic);
        }

        let mut profiles = Vec::new();
        for def in &self.evidence {
            builder.evidence(EvidenceEntry::new(def.id.as_str(), def.name.as_str()));
            if def.profile {
                profiles.push(def.id.as_str());
            }
            if let Some(name) = &def.script {
                builder.evidence_script(def.id.as_str(), lookup(name)?);
            }
        }
        builder.catalog(profiles.into_iter().collect::<ProfileSet>());

        let enc = &self.encounter;
        if let Some(name) = &enc.wrong_evidence {
            builder.wrong_evidence_script(lookup(name)?);
        }
        if let Some(name) = &enc.wrong_profile {
            builder.wrong_profile_script(lookup(name)?);
        }
        if let Some(name) = &enc.initial_script {
            builder.initial_script(lookup(name)?, enc.initial_lock_flag.as_deref());
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [encounter]
        initial_script = "hello"
        wrong_evidence = "huh"

        [[script]]
        id = "hello"
        lines = ["[EMOTION=normal]Hi.", { text = "It's me.", voice = "me_01" }]

        [[script]]
        id = "huh"
        lines = ["Huh?"]
        then = "exit_early"

        [[topic]]
        id = "weather"
        label = "The weather"
        script = "hello"
        hide_when_completed = true

        [[evidence]]
        id = "badge"
        name = "Attorney's Badge"
        script = "hello"
    "#;

    #[test]
    fn sample_builds() {
        let content = parse(SAMPLE).unwrap();
        assert_eq!(content.line_count(), 3);
        assert_eq!(content.evidence_ids(), ["badge"]);
        let enc = content
            .build(&DialogueConfig::default(), EncounterConfig::default())
            .unwrap();
        assert_eq!(enc.topics().len(), 1);
        assert!(enc.script_for_evidence("rope").is_some());
    }

    #[test]
    fn dangling_script_name_is_reported() {
        let content = parse(
            r#"
            [[topic]]
            id = "t"
            label = "T"
            script = "missing"
            "#,
        )
        .unwrap();
        let err = content
            .build(&DialogueConfig::default(), EncounterConfig::default())
            .err()
            .unwrap();
        assert!(format!("{:#}", err).contains("unknown script 'missing'"));
    }

    #[test]
    fn bad_markup_names_the_script() {
        let content = parse(
            r#"
            [[script]]
            id = "broken"
            lines = ["fine", "[PAUSE=soon]"]
            "#,
        )
        .unwrap();
        let err = content
            .build(&DialogueConfig::default(), EncounterConfig::default())
            .err()
            .unwrap();
        let msg = format!("{:#}", err);
        assert!(msg.contains("script 'broken'"));
        assert!(msg.contains("line 2"));
    }
}
