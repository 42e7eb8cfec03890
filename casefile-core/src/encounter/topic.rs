use anyhow::bail;

use crate::encounter::script::ScriptId;
use crate::runtime::SceneState;

/// A conversation topic offered in the encounter's topic menu.
#[derive(Debug, Clone)]
pub struct Topic {
    pub id: String,
    pub label: String,
    pub script: ScriptId,
    /// Flag that must be set before the topic shows up.
    pub unlock_flag: Option<String>,
    pub hide_when_completed: bool,
    /// Partner who has to be present; such topics vanish once completed.
    pub required_partner: Option<String>,
    /// Played instead of the generic wrong-evidence script when this
    /// topic's script asks for a redirect.
    pub wrong_evidence_script: Option<ScriptId>,

    pub enabled: bool,
    pub completed: bool,
    /// Unlocked since the menu was last built.
    pub is_new: bool,
}

impl Topic {
    pub fn new(id: impl Into<String>, label: impl Into<String>, script: ScriptId) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            script,
            unlock_flag: None,
            hide_when_completed: false,
            required_partner: None,
            wrong_evidence_script: None,
            enabled: true,
            completed: false,
            is_new: false,
        }
    }

    pub fn unlocked_by(mut self, flag: impl Into<String>) -> Self {
        self.unlock_flag = Some(flag.into());
        self
    }

    pub fn hidden_when_completed(mut self) -> Self {
        self.hide_when_completed = true;
        self
    }

    pub fn requires_partner(mut self, partner: impl Into<String>) -> Self {
        self.required_partner = Some(partner.into());
        self
    }

    pub fn with_wrong_evidence(mut self, script: ScriptId) -> Self {
        self.wrong_evidence_script = Some(script);
        self
    }

    fn is_available(&self, state: &SceneState) -> bool {
        let unlocked = self.unlock_flag.as_deref().is_none_or(|flag| state.has_flag(flag));
        let partnered = self
            .required_partner
            .as_deref()
            .is_none_or(|p| state.partner.as_deref() == Some(p));
        unlocked && partnered
    }
}

/// The one predicate both the menu builder and the index remapping use.
pub fn is_hidden_from_menu(topic: &Topic) -> bool {
    !topic.enabled
        || (topic.completed && topic.hide_when_completed)
        || (topic.completed && topic.required_partner.is_some())
}

/// Full-list indices of the topics the menu shows, in menu order.
pub fn visible_indices(topics: &[Topic]) -> Vec<usize> {
    topics
        .iter()
        .enumerate()
        .filter(|(_, t)| !is_hidden_from_menu(t))
        .map(|(i, _)| i)
        .collect()
}

/// Maps a position in the visible menu back to the full topic list.
pub fn resolve_compacted_index(topics: &[Topic], compacted: usize) -> anyhow::Result<usize> {
    let mut remaining = compacted;
    for (index, topic) in topics.iter().enumerate() {
        if is_hidden_from_menu(topic) {
            continue;
        }
        if remaining == 0 {
            return Ok(index);
        }
        remaining -= 1;
    }
    bail!(
        "menu index {} is past the {} visible topics",
        compacted,
        compacted - remaining
    )
}

#[derive(Debug, Clone, Default)]
pub struct TopicList {
    topics: Vec<Topic>,
    primed: bool,
}

impl TopicList {
    pub fn new(topics: Vec<Topic>) -> Self {
        Self { topics, primed: false }
    }

    /// Recomputes availability from scene state. Topics that became
    /// available since the previous refresh are marked new; the first
    /// refresh of an encounter marks nothing.
    pub fn refresh(&mut self, state: &SceneState) {
        for topic in &mut self.topics {
            let was_enabled = topic.enabled;
            topic.enabled = topic.is_available(state);
            if topic.enabled && !was_enabled && self.primed {
                log::debug!("topic '{}' unlocked", topic.id);
                topic.is_new = true;
            }
            if !topic.enabled {
                topic.is_new = false;
            }
        }
        self.primed = true;
    }

    /// Forgets refresh history so the next refresh badges nothing.
    pub fn unprime(&mut self) {
        self.primed = false;
    }

    pub fn visible(&self) -> impl Iterator<Item = &Topic> {
        self.topics.iter().filter(|t| !is_hidden_from_menu(t))
    }

    pub fn visible_count(&self) -> usize {
        self.visible().count()
    }

    pub fn resolve(&self, compacted: usize) -> anyhow::Result<usize> {
        resolve_compacted_index(&self.topics, compacted)
    }

    pub fn get(&self, index: usize) -> Option<&Topic> {
        self.topics.get(index)
    }

    pub fn mark_started(&mut self, index: usize) {
        if let Some(topic) = self.topics.get_mut(index) {
            topic.is_new = false;
        }
    }

    pub fn mark_completed(&mut self, index: usize) {
        if let Some(topic) = self.topics.get_mut(index) {
            log::debug!("topic '{}' completed", topic.id);
            topic.completed = true;
            topic.is_new = false;
        }
    }

    pub fn as_slice(&self) -> &[Topic] {
        &self.topics
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(id: &str) -> Topic {
        Topic::new(id, id.to_uppercase(), ScriptId(0))
    }

    #[test]
    fn compaction_skips_hidden_slots() {
        let mut disabled = topic("b");
        disabled.enabled = false;
        let mut done = topic("d").hidden_when_completed();
        done.completed = true;
        let topics = vec![topic("a"), disabled, topic("c"), done];

        assert_eq!(visible_indices(&topics), vec![0, 2]);
        assert_eq!(resolve_compacted_index(&topics, 0).unwrap(), 0);
        assert_eq!(resolve_compacted_index(&topics, 1).unwrap(), 2);
        assert!(resolve_compacted_index(&topics, 2).is_err());
    }

    #[test]
    fn completed_partner_topic_is_hidden() {
        let mut t = topic("x").requires_partner("maya");
        assert!(!is_hidden_from_menu(&t));
        t.completed = true;
        assert!(is_hidden_from_menu(&t));
    }

    #[test]
    fn refresh_badges_only_later_unlocks() {
        let mut state = SceneState::new();
        let mut list = TopicList::new(vec![topic("open"), topic("locked").unlocked_by("clue")]);
        list.refresh(&state);
        assert_eq!(list.visible_count(), 1);
        assert!(list.visible().all(|t| !t.is_new));

        state.set_flag("clue");
        list.refresh(&state);
        let fresh: Vec<_> = list.visible().filter(|t| t.is_new).map(|t| t.id.as_str()).collect();
        assert_eq!(fresh, ["locked"]);

        list.mark_started(1);
        assert!(!list.get(1).unwrap().is_new);
    }
}
