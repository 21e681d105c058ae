//! Command-line front end for the reminder parser.
//!
//! # Responsibility
//! - Verify `yadavar_core` linkage without the Flutter/FFI runtime.
//! - Show how one utterance is understood: `yadavar_cli <utterance...>`.

use chrono::Local;
use std::process::ExitCode;
use yadavar_core::calendar::persian_digits;
use yadavar_core::{parse, JalaliDate};

fn main() -> ExitCode {
    let utterance = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if utterance.trim().is_empty() {
        println!("yadavar_core ping={}", yadavar_core::ping());
        println!("yadavar_core version={}", yadavar_core::core_version());
        println!("usage: yadavar_cli <utterance>");
        return ExitCode::SUCCESS;
    }

    let now = Local::now().naive_local();
    match parse(&utterance, now) {
        Ok(parsed) => {
            let jalali = JalaliDate::from_gregorian(parsed.trigger_at.date());
            println!("message={}", parsed.message);
            println!(
                "trigger_at={} jalali={} {}",
                parsed.trigger_at.format("%Y-%m-%d %H:%M"),
                persian_digits(&jalali.to_string()),
                jalali.month_name()
            );
            println!("repeat={}", parsed.repeat.persian_label());
            if let Some(days) = parsed.custom_days() {
                let names = days.iter().map(|day| day.persian_name()).collect::<Vec<_>>();
                println!("days={}", names.join("، "));
            }
            println!("priority={}", parsed.priority.as_str());
            if let Some(minutes) = parsed.offset_minutes {
                println!("offset_minutes={minutes}");
            }
            ExitCode::SUCCESS
        }
        Err(failure) => {
            eprintln!("{failure}");
            eprintln!("{}", failure.guidance());
            ExitCode::FAILURE
        }
    }
}
