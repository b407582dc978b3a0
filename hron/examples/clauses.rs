//! `except`, `until`, `starting` and `during` in action.
//!
//! cargo run -p hron --example clauses

use hron::Schedule;
use jiff::Zoned;

fn show(expr: &str, from: &Zoned, n: usize) -> Result<(), Box<dyn std::error::Error>> {
    let schedule = Schedule::parse(expr)?;
    println!("{schedule}");
    for hit in schedule.next_n_from(from, n) {
        println!("  {}", hit.strftime("%a %Y-%m-%d %H:%M %Z"));
    }
    println!();
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let from: Zoned = "2026-12-20T00:00:00+00:00[UTC]".parse()?;
    show("every day at 09:00 except dec 25, 2027-01-01", &from, 14)?;
    show("every day at 09:00 until 2026-12-24", &from, 14)?;
    show("every 2 weeks on mon at 09:00 starting 2027-01-11", &from, 4)?;
    show("every month on the last weekday at 17:00 during mar, jun, sep, dec", &from, 4)?;
    show(
        "every month on the next nearest weekday to 1st at 08:00 in Asia/Tokyo",
        &from,
        4,
    )?;
    Ok(())
}
