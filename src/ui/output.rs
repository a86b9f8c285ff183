//! Output functions for consistent build log formatting

use console::style;

/// Display a contribution title, e.g. `Python Packages latest`
pub fn title(name: &str, version: &str) {
    println!();
    println!("{} {}", style(name).cyan().bold(), style(version).cyan());
}

/// Display an info step
pub fn step_info(message: &str) {
    println!("  {}", message);
}

/// Display a success step
pub fn step_ok(message: &str) {
    println!("  {} {}", style("[OK]").green(), message);
}

/// Display a warning step
pub fn step_warn(message: &str) {
    println!("  {} {}", style("[WARN]").yellow(), message);
}

/// Display an error step
pub fn step_error(message: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), message);
}

/// Display a hint following an error
pub fn hint(message: &str) {
    eprintln!("{} {}", style("Hint:").yellow(), message);
}
