//! Terminal status output: coloured message macros and the scan progress bar.
use indicatif::{ProgressBar, ProgressStyle};

/// Prints a `[!]` line to stderr. With the extra arguments the line is
/// suppressed in quiet mode and printed without colour in accessible mode.
#[macro_export]
macro_rules! warning {
    ($name:expr) => {
        eprintln!("{} {}", ansi_term::Colour::Red.bold().paint("[!]"), $name);
    };
    ($name:expr, $quiet:expr, $accessible:expr) => {
        // if not quiet then print, otherwise no else statement so do not print.
        if !$quiet {
            if $accessible {
                eprintln!("{}", $name);
            } else {
                eprintln!("{} {}", ansi_term::Colour::Red.bold().paint("[!]"), $name);
            }
        }
    };
}

/// Prints a `[~]` progress line.
#[macro_export]
macro_rules! detail {
    ($name:expr) => {
        println!("{} {}", ansi_term::Colour::Blue.bold().paint("[~]"), $name);
    };
    ($name:expr, $quiet:expr, $accessible:expr) => {
        if !$quiet {
            if $accessible {
                println!("{}", $name);
            } else {
                println!("{} {}", ansi_term::Colour::Blue.bold().paint("[~]"), $name);
            }
        }
    };
}

/// Prints a `[>]` result line.
#[macro_export]
macro_rules! output {
    ($name:expr) => {
        println!(
            "{} {}",
            ansi_term::Colour::RGB(0, 255, 9).bold().paint("[>]"),
            $name
        );
    };
    ($name:expr, $quiet:expr, $accessible:expr) => {
        if !$quiet {
            if $accessible {
                println!("{}", $name);
            } else {
                println!(
                    "{} {}",
                    ansi_term::Colour::RGB(0, 255, 9).bold().paint("[>]"),
                    $name
                );
            }
        }
    };
}

/// A bar counting finished probe tasks, hidden in quiet or accessible mode.
pub fn progress_bar(total: usize, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} probed",
    ) {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}

#[cfg(test)]
mod tests {
    use super::progress_bar;

    #[test]
    fn hidden_bar_still_counts() {
        let bar = progress_bar(10, true);
        bar.set_position(4);
        assert!(bar.is_hidden());
        assert_eq!(bar.position(), 4);
    }

    #[test]
    fn visible_bar_has_length() {
        let bar = progress_bar(7, false);
        assert_eq!(bar.length(), Some(7));
        bar.finish_and_clear();
    }

    #[test]
    fn macros_respect_quiet_flag() {
        // Only checks that every arm expands; quiet calls print nothing.
        warning!("quiet", true, false);
        detail!("quiet", true, true);
        output!("quiet", true, false);
    }
}
