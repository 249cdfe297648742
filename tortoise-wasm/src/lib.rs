use tortoise_core::error::{Diagnostic, Severity};
use tortoise_core::interpreter::{Interpreter, RunOptions};
use tortoise_svg::{RenderOptions, render_with_options};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct RenderOutput {
    svg: String,
    diagnostics: String,
    has_error: bool,
}

#[wasm_bindgen]
impl RenderOutput {
    #[wasm_bindgen(getter)]
    pub fn svg(&self) -> String {
        self.svg.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn diagnostics(&self) -> String {
        self.diagnostics.clone()
    }

    #[wasm_bindgen(getter, js_name = hasError)]
    pub fn has_error(&self) -> bool {
        self.has_error
    }
}

#[wasm_bindgen]
pub fn render_turtle(
    source: &str,
    width: f64,
    height: f64,
    max_operations: f64,
    draw_cursor: bool,
) -> RenderOutput {
    run_program(
        source,
        RunOptions {
            width,
            height,
            max_operations: operation_limit(max_operations),
            draw_cursor,
        },
    )
}

/// JS numbers arrive as `f64`; anything non-finite or negative allows no
/// operations.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "value is floored and clamped to the u64 range first"
)]
fn operation_limit(value: f64) -> u64 {
    if value.is_nan() || value <= 0.0 {
        0
    } else if value >= u64::MAX as f64 {
        u64::MAX
    } else {
        value.floor() as u64
    }
}

fn run_program(source: &str, options: RunOptions) -> RenderOutput {
    let mut interpreter = Interpreter::with_options(options);
    interpreter.run(source);

    let svg = render_with_options(interpreter.picture(), &RenderOptions::default()).to_string();

    RenderOutput {
        svg,
        diagnostics: collect_diagnostics(&interpreter.errors),
        has_error: interpreter.has_errors(),
    }
}

/// One line per distinct diagnostic, first occurrence order.
fn collect_diagnostics(errors: &[Diagnostic]) -> String {
    let mut lines: Vec<String> = Vec::new();
    for err in errors {
        let line = format_diagnostic(err);
        if !lines.contains(&line) {
            lines.push(line);
        }
    }
    lines.join("\n")
}

fn format_diagnostic(err: &Diagnostic) -> String {
    let label = match err.severity {
        Severity::Info => "info",
        Severity::Warning => "warning",
        Severity::Error => "error",
    };

    if let Some(span) = err.span {
        format!("{label} [{}..{}] {}", span.start, span.end, err.message)
    } else {
        format!("{label} {}", err.message)
    }
}

#[cfg(test)]
mod tests {
    use super::{operation_limit, render_turtle};

    #[test]
    fn renders_square() {
        let output = render_turtle("R(4){D(50) +(90)}", 300.0, 200.0, 1_000_000.0, false);

        assert!(
            !output.has_error,
            "unexpected diagnostics: {}",
            output.diagnostics
        );
        assert!(output.svg.contains("<svg"), "missing SVG root");
        assert!(output.svg.contains("M150 100 L200 100"), "got: {}", output.svg);
    }

    #[test]
    fn reports_errors_for_invalid_source() {
        let output = render_turtle("D Q", 100.0, 100.0, 1_000_000.0, false);

        assert!(output.has_error, "expected error");
        assert!(
            output.diagnostics.starts_with("error [2..3] Unknown command: Q"),
            "got: {}",
            output.diagnostics
        );
        assert!(output.svg.contains("<path"), "geometry should survive errors");
    }

    #[test]
    fn repeated_diagnostics_are_shown_once() {
        let output = render_turtle("R(5){]}", 100.0, 100.0, 1_000_000.0, false);

        assert!(output.has_error, "expected error");
        assert_eq!(output.diagnostics.lines().count(), 1, "got: {}", output.diagnostics);
    }

    #[test]
    fn warnings_alone_are_not_errors() {
        let output = render_turtle("D )", 100.0, 100.0, 1_000_000.0, false);

        assert!(!output.has_error, "got: {}", output.diagnostics);
        assert!(output.diagnostics.starts_with("warning"), "got: {}", output.diagnostics);
    }

    #[test]
    fn budget_exhaustion_is_reported() {
        let output = render_turtle("R(100){D}", 100.0, 100.0, 10.0, false);

        assert!(output.has_error);
        assert!(
            output.diagnostics.contains("Command limit exceeded, limit=10"),
            "got: {}",
            output.diagnostics
        );
    }

    #[test]
    fn cursor_is_drawn() {
        let output = render_turtle("", 100.0, 100.0, 1_000_000.0, true);
        assert!(output.svg.contains("rgba(0, 200, 0, 0.6)"), "got: {}", output.svg);
    }

    #[test]
    fn operation_limit_from_js_number() {
        assert_eq!(operation_limit(f64::NAN), 0);
        assert_eq!(operation_limit(-3.0), 0);
        assert_eq!(operation_limit(12.9), 12);
        assert_eq!(operation_limit(f64::INFINITY), u64::MAX);
    }
}
