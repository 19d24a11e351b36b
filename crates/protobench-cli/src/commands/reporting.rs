use colored::Colorize;
use protobench_spec::{Diagnostic, Severity};

/// Prints compiler diagnostics on stderr, one per line.
pub(crate) fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        let label = match diagnostic.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
        };
        match location(diagnostic) {
            Some(location) => eprintln!("{} {}: {}", location.as_str().dimmed(), label, diagnostic.message),
            None => eprintln!("{}: {}", label, diagnostic.message),
        }
    }
}

fn location(diagnostic: &Diagnostic) -> Option<String> {
    let file = diagnostic.file.as_deref()?;
    Some(match (diagnostic.line, diagnostic.column) {
        (Some(line), Some(col)) => format!("{}:{}:{}:", file, line, col),
        (Some(line), None) => format!("{}:{}:", file, line),
        _ => format!("{}:", file),
    })
}
