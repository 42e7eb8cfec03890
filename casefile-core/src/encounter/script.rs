use std::collections::VecDeque;
use std::fmt;

use casefile_markup::MarkupError;

use crate::config::DialogueConfig;
use crate::dialogue::DialogueBox;
use crate::runtime::SceneState;

/// Index of a script registered with an [`EncounterBuilder`](super::EncounterBuilder).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScriptId(pub(crate) usize);

impl fmt::Display for ScriptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "script#{}", self.0)
    }
}

/// Something a running script asks the encounter to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptRequest {
    PresentEvidence,
    EndEncounter,
}

/// A scripted sequence the encounter runs against the shared scene state.
pub trait Script {
    fn begin(&mut self, state: &mut SceneState);

    fn update(&mut self, delta_ms: u32, state: &mut SceneState) -> Option<ScriptRequest>;

    fn is_finished(&self) -> bool;

    /// The script bailed out and the encounter should go straight back to
    /// its menu without marking anything completed.
    fn was_early_exit_requested(&self) -> bool;

    fn should_redirect_to_wrong_evidence(&self) -> bool;

    fn reset(&mut self);

    fn skip(&mut self, _state: &mut SceneState) {}
}

#[derive(Debug, Clone)]
pub enum Step {
    Line(DialogueBox),
    Wait(u32),
    SetFlag(String),
    Request(ScriptRequest),
    RedirectToWrongEvidence,
    ExitEarly,
}

/// Plays dialogue units and simple scripted steps in order.
///
/// Each line is held on screen for `hold_ms` after it finishes before the
/// script moves on.
#[derive(Debug, Clone)]
pub struct LineScript {
    steps: Vec<Step>,
    hold_ms: u32,
    index: usize,
    elapsed_ms: u32,
    pending: VecDeque<ScriptRequest>,
    finished: bool,
    early_exit: bool,
    redirect: bool,
}

impl LineScript {
    pub fn new(hold_ms: u32) -> Self {
        Self {
            steps: Vec::new(),
            hold_ms,
            index: 0,
            elapsed_ms: 0,
            pending: VecDeque::new(),
            finished: false,
            early_exit: false,
            redirect: false,
        }
    }

    /// Parses each entry as one dialogue unit.
    pub fn from_lines<S: AsRef<str>>(
        lines: &[S],
        config: &DialogueConfig,
        hold_ms: u32,
    ) -> Result<Self, MarkupError> {
        let mut script = Self::new(hold_ms);
        for line in lines {
            script.steps.push(Step::Line(DialogueBox::from_markup(line.as_ref(), config)?));
        }
        Ok(script)
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn line(self, dialogue: DialogueBox) -> Self {
        self.step(Step::Line(dialogue))
    }

    pub fn wait(self, ms: u32) -> Self {
        self.step(Step::Wait(ms))
    }

    pub fn set_flag(self, flag: impl Into<String>) -> Self {
        self.step(Step::SetFlag(flag.into()))
    }

    pub fn request(self, request: ScriptRequest) -> Self {
        self.step(Step::Request(request))
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn current_line(&self) -> Option<&DialogueBox> {
        match self.steps.get(self.index) {
            Some(Step::Line(dialogue)) if dialogue.is_started() => Some(dialogue),
            _ => None,
        }
    }

    /// Runs instant steps until one that takes time is reached. A request
    /// also stops the run: it is queued for the next `update` and the steps
    /// after it wait until it has been reported.
    fn enter(&mut self, state: &mut SceneState) {
        self.elapsed_ms = 0;
        while let Some(step) = self.steps.get_mut(self.index) {
            match step {
                Step::Line(dialogue) => {
                    dialogue.begin(state);
                    return;
                }
                Step::Wait(_) => return,
                Step::SetFlag(flag) => {
                    log::debug!("script sets flag '{}'", flag);
                    state.set_flag(flag.clone());
                }
                Step::Request(request) => {
                    self.pending.push_back(*request);
                    self.index += 1;
                    return;
                }
                Step::RedirectToWrongEvidence => self.redirect = true,
                Step::ExitEarly => {
                    self.early_exit = true;
                    self.finished = true;
                    return;
                }
            }
            self.index += 1;
        }
        self.finished = true;
    }
}

impl Script for LineScript {
    fn begin(&mut self, state: &mut SceneState) {
        self.reset();
        self.enter(state);
    }

    fn update(&mut self, delta_ms: u32, state: &mut SceneState) -> Option<ScriptRequest> {
        if let Some(request) = self.pending.pop_front() {
            return Some(request);
        }
        if self.finished {
            return None;
        }

        let hold_ms = self.hold_ms;
        let done = match self.steps.get_mut(self.index) {
            Some(Step::Line(dialogue)) => {
                dialogue.update(delta_ms, state);
                if dialogue.is_finished() {
                    self.elapsed_ms = self.elapsed_ms.saturating_add(delta_ms);
                    self.elapsed_ms >= hold_ms
                } else {
                    false
                }
            }
            Some(Step::Wait(ms)) => {
                self.elapsed_ms = self.elapsed_ms.saturating_add(delta_ms);
                self.elapsed_ms >= *ms
            }
            Some(_) => {
                self.enter(state);
                return self.pending.pop_front();
            }
            None => true,
        };

        if done {
            self.index += 1;
            self.enter(state);
        }
        self.pending.pop_front()
    }

    fn is_finished(&self) -> bool {
        self.finished && self.pending.is_empty()
    }

    fn was_early_exit_requested(&self) -> bool {
        self.early_exit
    }

    fn should_redirect_to_wrong_evidence(&self) -> bool {
        self.redirect
    }

    fn reset(&mut self) {
        self.index = 0;
        self.elapsed_ms = 0;
        self.pending.clear();
        self.finished = false;
        self.early_exit = false;
        self.redirect = false;
    }

    fn skip(&mut self, state: &mut SceneState) {
        match self.steps.get_mut(self.index) {
            Some(Step::Line(dialogue)) if !dialogue.is_text_complete() => dialogue.skip(state),
            Some(Step::Line(_)) => self.elapsed_ms = self.hold_ms,
            _ => {}
        }
    }
}
