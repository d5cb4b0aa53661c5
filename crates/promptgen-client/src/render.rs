use std::io::{self, IsTerminal, Write};
use std::sync::Mutex;

use promptgen_types::RenderState;

pub const LOADING_TEXT: &str = "⏳ Generating, please wait...";
pub const WARNING_PREFIX: &str = "⚠️ Warning: ";
pub const ERROR_PREFIX: &str = "❌ Error: ";

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Maps a render state onto the display region. Called with every state the
/// controller commits, in commit order.
pub trait Renderer: Send + Sync {
    fn render(&self, state: &RenderState);
}

impl<F> Renderer for F
where
    F: Fn(&RenderState) + Send + Sync,
{
    fn render(&self, state: &RenderState) {
        self(state)
    }
}

/// Renderer that shows nothing. Useful when only the returned `Outcome` matters.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&self, _state: &RenderState) {}
}

// ---------------------------------------------------------------------------
// Plain-text display
// ---------------------------------------------------------------------------

/// Make server-controlled text safe to print. Newlines and tabs survive; every
/// other control character (ESC included) becomes U+FFFD so content can never
/// drive the terminal. CRLF collapses to LF.
pub fn sanitize_display_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\n' | '\t' => out.push(c),
            '\r' if chars.peek() == Some(&'\n') => {}
            c if c.is_control() => out.push(char::REPLACEMENT_CHARACTER),
            c => out.push(c),
        }
    }
    out
}

/// Unstyled text for a state, or `None` for `Idle`.
pub fn display_text(state: &RenderState) -> Option<String> {
    match state {
        RenderState::Idle => None,
        RenderState::Loading => Some(LOADING_TEXT.to_string()),
        RenderState::Success(text) => Some(sanitize_display_text(text)),
        RenderState::Warning(msg) => Some(format!("{WARNING_PREFIX}{}", sanitize_display_text(msg))),
        RenderState::Error(msg) => Some(format!("{ERROR_PREFIX}{}", sanitize_display_text(msg))),
    }
}

// ---------------------------------------------------------------------------
// TerminalRenderer
// ---------------------------------------------------------------------------

const ANSI_RESET: &str = "\x1b[0m";

fn ansi_style(state: &RenderState) -> Option<&'static str> {
    match state {
        RenderState::Loading => Some("\x1b[2m"),
        RenderState::Warning(_) => Some("\x1b[33m"),
        RenderState::Error(_) => Some("\x1b[31m"),
        RenderState::Idle | RenderState::Success(_) => None,
    }
}

const ERASE_LINE: &str = "\r\x1b[2K";

struct Screen<W> {
    writer: W,
    /// The loading line is on screen with the cursor still on it.
    loading_shown: bool,
}

/// Writes each committed state as plain text.
///
/// On a terminal (`styled`) the loading line is left open and erased by the
/// next state, so only one state is ever visible. Other writers get one
/// block per state.
pub struct TerminalRenderer<W: Write + Send> {
    out: Mutex<Screen<W>>,
    styled: bool,
}

impl<W: Write + Send> TerminalRenderer<W> {
    pub fn new(writer: W) -> Self {
        Self {
            out: Mutex::new(Screen {
                writer,
                loading_shown: false,
            }),
            styled: false,
        }
    }

    /// Tint warnings, errors and the loading line with ANSI colors, and
    /// redraw in place. The color comes from the state tag only, never from
    /// the content.
    pub fn styled(mut self, styled: bool) -> Self {
        self.styled = styled;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .writer
    }

    fn write_state(&self, screen: &mut Screen<W>, state: &RenderState) -> io::Result<()> {
        let out = &mut screen.writer;
        if self.styled && screen.loading_shown {
            out.write_all(ERASE_LINE.as_bytes())?;
            screen.loading_shown = false;
        }

        let Some(text) = display_text(state) else {
            return out.flush();
        };

        match ansi_style(state).filter(|_| self.styled) {
            Some(style) => write!(out, "{style}{text}{ANSI_RESET}")?,
            None => out.write_all(text.as_bytes())?,
        }

        if self.styled && *state == RenderState::Loading {
            screen.loading_shown = true;
        } else if !text.ends_with('\n') {
            out.write_all(b"\n")?;
        }
        out.flush()
    }
}

impl TerminalRenderer<io::Stdout> {
    /// Render to stdout, styled only when stdout is a terminal.
    pub fn stdout() -> Self {
        let styled = io::stdout().is_terminal();
        Self::new(io::stdout()).styled(styled)
    }
}

impl<W: Write + Send> Renderer for TerminalRenderer<W> {
    fn render(&self, state: &RenderState) {
        let mut screen = self.out.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Err(e) = self.write_state(&mut screen, state) {
            tracing::warn!(error = %e, state = state.label(), "failed to write render state");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(states: &[RenderState], styled: bool) -> String {
        let renderer = TerminalRenderer::new(Vec::new()).styled(styled);
        for state in states {
            renderer.render(state);
        }
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    #[test]
    fn sanitize_keeps_newlines_and_tabs() {
        assert_eq!(
            sanitize_display_text("Step 1\n\tStep 2\r\nStep 3"),
            "Step 1\n\tStep 2\nStep 3"
        );
    }

    #[test]
    fn sanitize_replaces_escape_sequences() {
        let out = sanitize_display_text("\x1b[31mred\x1b[0m\x07");
        assert!(!out.contains('\x1b'));
        assert!(!out.contains('\x07'));
        assert_eq!(out, "\u{FFFD}[31mred\u{FFFD}[0m\u{FFFD}");
        assert_eq!(sanitize_display_text("a\rb"), "a\u{FFFD}b");
    }

    #[test]
    fn markup_is_shown_verbatim() {
        let state = RenderState::Success("<b>bold</b> & <script>x()</script>".into());
        assert_eq!(
            display_text(&state).unwrap(),
            "<b>bold</b> & <script>x()</script>"
        );
    }

    #[test]
    fn display_text_per_state() {
        assert_eq!(display_text(&RenderState::Idle), None);
        assert_eq!(display_text(&RenderState::Loading).unwrap(), LOADING_TEXT);
        assert_eq!(
            display_text(&RenderState::Warning("empty".into())).unwrap(),
            "⚠️ Warning: empty"
        );
        assert_eq!(
            display_text(&RenderState::Error("overloaded".into())).unwrap(),
            "❌ Error: overloaded"
        );
    }

    #[test]
    fn piped_renderer_writes_blocks() {
        let out = rendered(
            &[
                RenderState::Idle,
                RenderState::Loading,
                RenderState::Success("line one\nline two".into()),
            ],
            false,
        );
        assert_eq!(out, format!("{LOADING_TEXT}\nline one\nline two\n"));
    }

    #[test]
    fn terminal_renderer_does_not_double_newline() {
        let out = rendered(&[RenderState::Success("done\n".into())], false);
        assert_eq!(out, "done\n");
    }

    #[test]
    fn styled_output_colors_tag_not_content() {
        let out = rendered(&[RenderState::Error("\x1b[32mfake".into())], true);
        assert_eq!(out, "\x1b[31m❌ Error: \u{FFFD}[32mfake\x1b[0m\n");

        let out = rendered(&[RenderState::Success("plain".into())], true);
        assert_eq!(out, "plain\n");
    }

    #[test]
    fn styled_loading_line_is_erased_by_next_state() {
        let out = rendered(
            &[RenderState::Loading, RenderState::Success("result".into())],
            true,
        );
        assert_eq!(
            out,
            format!("\x1b[2m{LOADING_TEXT}\x1b[0m\r\x1b[2Kresult\n")
        );
        // Everything before the erase is gone from the screen.
        let visible = out.rsplit(ERASE_LINE).next().unwrap();
        assert!(!visible.contains(LOADING_TEXT));
        assert_eq!(visible, "result\n");
    }

    #[test]
    fn styled_erase_applies_to_warnings_and_errors() {
        let out = rendered(
            &[RenderState::Loading, RenderState::Error("overloaded".into())],
            true,
        );
        let visible = out.rsplit(ERASE_LINE).next().unwrap();
        assert_eq!(visible, "\x1b[31m❌ Error: overloaded\x1b[0m\n");

        // A second loading line replaces the first one instead of stacking.
        let out = rendered(&[RenderState::Loading, RenderState::Loading], true);
        assert_eq!(out.matches(LOADING_TEXT).count(), 2);
        assert_eq!(out.rsplit(ERASE_LINE).count(), 2);
        assert!(!out.contains('\n'));
    }

    #[test]
    fn closure_renderer() {
        let seen = Mutex::new(Vec::new());
        let renderer = |state: &RenderState| seen.lock().unwrap().push(state.label());
        renderer.render(&RenderState::Loading);
        renderer.render(&RenderState::Warning("w".into()));
        assert_eq!(*seen.lock().unwrap(), vec!["loading", "warning"]);
    }
}
