use once_cell::sync::OnceCell;
use regex::Regex;

use crate::error::MarkupError;
use crate::event::{ColorMarker, ColorMode, ColorOp, EventDescriptor, EventKind, ParsedText};
use crate::lexer::{Lexer, Span, Tok, TokKind};

static TAG_RE: OnceCell<Regex> = OnceCell::new();

fn tag_re() -> &'static Regex {
    TAG_RE.get_or_init(|| {
        Regex::new(r"^\s*(/?[A-Z_]+)\s*(?:=(.*))?$").expect("tag pattern is valid")
    })
}

#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Render `( … )` in the aside colour, keeping the parentheses visible.
    pub auto_aside: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { auto_aside: true }
    }
}

struct OpenColor {
    mode: ColorMode,
    from_paren: bool,
    position: usize,
}

pub struct Parser<'a> {
    toks: &'a [Tok],
    cursor: usize,
    options: ParseOptions,
    out_len: usize,
    text: String,
    events: Vec<EventDescriptor>,
    colors: Vec<ColorMarker>,
    stack: Vec<OpenColor>,
}

impl<'a> Parser<'a> {
    pub fn new(toks: &'a [Tok]) -> Self {
        Self {
            toks,
            cursor: 0,
            options: ParseOptions::default(),
            out_len: 0,
            text: String::new(),
            events: Vec::new(),
            colors: Vec::new(),
            stack: Vec::new(),
        }
    }

    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    fn bump(&mut self) -> Option<&'a Tok> {
        let tok = self.toks.get(self.cursor)?;
        self.cursor += 1;
        Some(tok)
    }

    fn emit(&mut self, c: char) {
        self.text.push(c);
        self.out_len += 1;
    }

    pub fn parse(mut self) -> Result<ParsedText, MarkupError> {
        while let Some(tok) = self.bump() {
            match &tok.tok {
                TokKind::Char(c) => self.emit(*c),
                TokKind::Tag(body) => self.tag(body, tok.span)?,
                TokKind::OpenParen if self.options.auto_aside => {
                    self.push_color(ColorMode::Aside, true, tok.span.start);
                    self.emit('(');
                }
                TokKind::CloseParen if self.options.auto_aside => {
                    self.emit(')');
                    self.pop_color(ColorMode::Aside, true, tok.span.start)?;
                }
                TokKind::OpenParen => self.emit('('),
                TokKind::CloseParen => self.emit(')'),
            }
        }

        if let Some(open) = self.stack.last() {
            return Err(MarkupError::UnclosedColor { mode: open.mode, position: open.position });
        }

        Ok(ParsedText {
            text: self.text,
            events: self.events,
            colors: self.colors,
        })
    }

    fn tag(&mut self, body: &str, span: Span) -> Result<(), MarkupError> {
        let position = span.start;
        let caps = tag_re().captures(body).ok_or_else(|| MarkupError::UnknownTag {
            name: body.to_string(),
            position,
        })?;
        let name = caps.get(1).map_or("", |m| m.as_str());
        let arg = caps.get(2).map(|m| m.as_str().trim());
        let args = TagArgs { tag: name, arg, position };

        let kind = match name {
            "SPEED" => {
                let ms_per_char = args.number()?;
                if ms_per_char == 0 {
                    return Err(args.bad("0"));
                }
                EventKind::SpeedChange { ms_per_char }
            }
            "EMOTION" => EventKind::SpeakerEmotion(args.word()?),
            "OTHER_EMOTION" => EventKind::OtherEmotion(args.word()?),
            "PAUSE" => EventKind::Pause { ms: args.number()? },
            "AUDIO_PAUSE" => EventKind::AudioPause { ms: args.number()? },
            "MOUTH_OPEN" => args.bare(EventKind::MouthOpen)?,
            "MOUTH_CLOSE" => args.bare(EventKind::MouthClose)?,
            "SOUND" => EventKind::PlaySound(args.word()?),
            "SHAKE" => args.bare(EventKind::Shake)?,
            "SCREEN_SHAKE" => {
                let raw = args.required()?;
                let intensity: f32 = raw.parse().map_err(|_| args.bad(raw))?;
                if !intensity.is_finite() || intensity < 0.0 {
                    return Err(args.bad(raw));
                }
                EventKind::ScreenShake { intensity }
            }
            "NEXT_FRAME" => args.bare(EventKind::AdvanceFrame)?,
            "PLAYER_DAMAGED" => args.bare(EventKind::PlayerDamaged)?,
            "OPPONENT_DAMAGED" => args.bare(EventKind::OpponentDamaged)?,
            "BGM" => {
                let raw = args.required()?;
                let mut parts = raw.split(',').map(str::trim);
                let id = parts.next().filter(|s| !s.is_empty()).ok_or_else(|| args.bad(raw))?;
                let mut permanent = false;
                for flag in parts {
                    match flag {
                        "permanent" => permanent = true,
                        _ => return Err(args.bad(flag)),
                    }
                }
                EventKind::PlayBgm { id: id.to_string(), permanent }
            }
            "STOP_BGM" => {
                let (mut instant, mut permanent) = (false, false);
                for flag in arg.into_iter().flat_map(|a| a.split(',')).map(str::trim) {
                    match flag {
                        "instant" => instant = true,
                        "permanent" => permanent = true,
                        _ => return Err(args.bad(flag)),
                    }
                }
                EventKind::StopBgm { instant, permanent }
            }
            "ZOOM" => args.bare(EventKind::ZoomBegin)?,
            "END_ZOOM" => args.bare(EventKind::ZoomEnd)?,
            "BREAKDOWN" => args.bare(EventKind::BreakdownBegin)?,
            "END_BREAKDOWN" => args.bare(EventKind::BreakdownEnd)?,
            "ASIDE" | "EMPHASIS" | "/ASIDE" | "/EMPHASIS" => {
                args.bare(())?;
                let mode = if name.ends_with("ASIDE") { ColorMode::Aside } else { ColorMode::Emphasis };
                if name.starts_with('/') {
                    self.pop_color(mode, false, position)?;
                } else {
                    self.push_color(mode, false, position);
                }
                return Ok(());
            }
            _ => {
                return Err(MarkupError::UnknownTag { name: name.to_string(), position });
            }
        };

        log::trace!("tag [{}] at output offset {}", kind.tag(), self.out_len);
        self.events.push(EventDescriptor::new(self.out_len, kind));
        Ok(())
    }

    fn push_color(&mut self, mode: ColorMode, from_paren: bool, position: usize) {
        self.stack.push(OpenColor { mode, from_paren, position });
        self.colors.push(ColorMarker { offset: self.out_len, op: ColorOp::Push(mode) });
    }

    fn pop_color(&mut self, mode: ColorMode, from_paren: bool, position: usize) -> Result<(), MarkupError> {
        match self.stack.last() {
            Some(top) if top.mode == mode && top.from_paren == from_paren => {
                self.stack.pop();
                self.colors.push(ColorMarker { offset: self.out_len, op: ColorOp::Pop });
                Ok(())
            }
            _ => Err(MarkupError::UnbalancedColor { position }),
        }
    }
}

struct TagArgs<'t> {
    tag: &'t str,
    arg: Option<&'t str>,
    position: usize,
}

impl<'t> TagArgs<'t> {
    fn bad(&self, arg: &str) -> MarkupError {
        MarkupError::BadArgument {
            tag: self.tag.to_string(),
            arg: arg.to_string(),
            position: self.position,
        }
    }

    fn required(&self) -> Result<&'t str, MarkupError> {
        match self.arg {
            Some(a) if !a.is_empty() => Ok(a),
            _ => Err(MarkupError::MissingArgument {
                tag: self.tag.to_string(),
                position: self.position,
            }),
        }
    }

    fn bare<T>(&self, value: T) -> Result<T, MarkupError> {
        match self.arg {
            None => Ok(value),
            Some(_) => Err(MarkupError::UnexpectedArgument {
                tag: self.tag.to_string(),
                position: self.position,
            }),
        }
    }

    fn number(&self) -> Result<u32, MarkupError> {
        let raw = self.required()?;
        raw.parse().map_err(|_| self.bad(raw))
    }

    fn word(&self) -> Result<String, MarkupError> {
        let raw = self.required()?;
        if raw.chars().any(|c| c.is_whitespace() || c == ',') {
            return Err(self.bad(raw));
        }
        Ok(raw.to_string())
    }
}

/// Parses authored text with the default options.
pub fn parse(raw: &str) -> Result<ParsedText, MarkupError> {
    parse_with(raw, &ParseOptions::default())
}

pub fn parse_with(raw: &str, options: &ParseOptions) -> Result<ParsedText, MarkupError> {
    let tokens = Lexer::new(raw).run()?;
    Parser::new(&tokens).with_options(options.clone()).parse()
}
