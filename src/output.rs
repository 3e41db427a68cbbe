//! Colored user-facing messages. Colors only when the stream is a TTY.

use owo_colors::{OwoColorize, Style};

#[derive(Clone, Copy)]
enum Stream {
    Out,
    Err,
}

fn emit(stream: Stream, tag: &str, style: Style, msg: &str) {
    let tty = match stream {
        Stream::Out => atty::is(atty::Stream::Stdout),
        Stream::Err => atty::is(atty::Stream::Stderr),
    };
    let line = if tty {
        format!("{} {msg}", tag.style(style))
    } else {
        format!("{tag} {msg}")
    };
    match stream {
        Stream::Out => println!("{line}"),
        Stream::Err => eprintln!("{line}"),
    }
}

pub fn print_info(msg: &str) {
    emit(Stream::Out, "info:", Style::new().cyan().bold(), msg);
}

pub fn print_warn(msg: &str) {
    emit(Stream::Err, "warn:", Style::new().yellow().bold(), msg);
}

pub fn print_error(msg: &str) {
    emit(Stream::Err, "error:", Style::new().red().bold(), msg);
}

pub fn print_success(msg: &str) {
    emit(Stream::Out, "ok:", Style::new().green().bold(), msg);
}

/// Plain line without a prefix, for output users may script against.
pub fn print_user(msg: &str) {
    println!("{msg}");
}
