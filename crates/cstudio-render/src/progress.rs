//! Remotion CLI progress parsing.
//!
//! The CLI reports two phases, each as `<done>/<total>` frames:
//! rendering (`Rendered 120/900`, `Rendering frames ... 120/900`) and
//! encoding (`Encoded 120/900`, `Stitched 120/900`). Both are folded
//! into one 0.0-1.0 fraction.

use std::sync::{Arc, LazyLock};

use regex::Regex;

/// Share of the overall fraction taken by the frame rendering phase.
const RENDER_PHASE_WEIGHT: f64 = 0.8;

static PHASE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(rendered|rendering frames|encoded|encoding|stitched|stitching)\b\D*?(\d+)\s*/\s*(\d+)")
        .expect("progress regex")
});

/// Render phase reported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPhase {
    Rendering,
    Encoding,
}

/// One parsed progress report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderProgress {
    pub phase: RenderPhase,
    pub done: u64,
    pub total: u64,
}

impl RenderProgress {
    /// Overall completion in 0.0-1.0.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let phase = (self.done as f64 / self.total as f64).clamp(0.0, 1.0);
        match self.phase {
            RenderPhase::Rendering => phase * RENDER_PHASE_WEIGHT,
            RenderPhase::Encoding => RENDER_PHASE_WEIGHT + phase * (1.0 - RENDER_PHASE_WEIGHT),
        }
    }
}

/// Parse a CLI output line into a progress report.
pub fn parse_progress_line(line: &str) -> Option<RenderProgress> {
    let caps = PHASE_RE.captures(line)?;
    let phase = match caps[1].to_lowercase().as_str() {
        "rendered" | "rendering frames" => RenderPhase::Rendering,
        _ => RenderPhase::Encoding,
    };

    Some(RenderProgress {
        phase,
        done: caps[2].parse().ok()?,
        total: caps[3].parse().ok()?,
    })
}

/// Callback type for progress updates (0.0-1.0).
pub type ProgressCallback = Arc<dyn Fn(f64) + Send + Sync + 'static>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rendered_line() {
        let p = parse_progress_line("Rendered 450/900, time remaining: 12s").unwrap();
        assert_eq!(p.phase, RenderPhase::Rendering);
        assert_eq!(p.done, 450);
        assert_eq!(p.total, 900);
        assert!((p.fraction() - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_parse_encoding_line() {
        let p = parse_progress_line("Encoding ━━━━━━━━━━━ 900/900").unwrap();
        assert_eq!(p.phase, RenderPhase::Encoding);
        assert!((p.fraction() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_unrelated_lines_are_ignored() {
        assert!(parse_progress_line("Bundling 100%").is_none());
        assert!(parse_progress_line("Composition MinimalTheme").is_none());
    }
}
