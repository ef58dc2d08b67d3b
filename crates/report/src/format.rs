//! Rendering a workflow run into a Telegram message.
//!
//! The layout uses Telegram's legacy `Markdown` dialect:
//!
//! ```text
//! 🔔 *CI*
//!
//! 💼 *Status*: Success
//! 🕒 *Completed in*: 4m 12s
//!
//! *Job Details:*
//! ✅ `build` (3m 2s)
//! ⏭️ `deploy` (0m 0s)
//! ```
//!
//! Legacy Markdown has no escape sequences inside an entity, so the
//! delimiter of the surrounding entity is replaced in interpolated names.

use tracing::{debug, warn};

use crate::{status_icon, Elapsed, Job, OutgoingMessage, Timestamp, WorkflowRun};

/// Telegram's maximum message length, counted in UTF-16 code units.
pub const MAX_MESSAGE_UNITS: usize = 4096;

/// Longest run or job name rendered before clipping.
const MAX_NAME_CHARS: usize = 256;

/// Computes the time between `start` and `end`.
///
/// Returns [`Elapsed::Invalid`] when `end` precedes `start`.
pub fn compute_duration(start: Timestamp, end: Timestamp) -> Elapsed {
    match (end.as_datetime() - start.as_datetime()).to_std() {
        Ok(span) => Elapsed::Span(span),
        Err(_) => {
            warn!(%start, %end, "End time is earlier than start time");
            Elapsed::Invalid
        }
    }
}

/// Computes how long a job ran, or [`Elapsed::Pending`] if it has not
/// both started and finished.
pub fn job_elapsed(job: &Job) -> Elapsed {
    match (job.started_at, job.completed_at) {
        (Some(start), Some(end)) => compute_duration(start, end),
        _ => Elapsed::Pending,
    }
}

/// Renders the notification for `run` and its `jobs`.
///
/// Job lines are emitted in the order given. If the full list would push the
/// message past [`MAX_MESSAGE_UNITS`], trailing jobs are summarised in a
/// single `…and N more jobs` line (`…and 1 more job` when only one is
/// dropped).
pub fn format_message(run: &WorkflowRun, jobs: &[Job]) -> OutgoingMessage {
    let status = run.overall_status(jobs);

    let mut text = format!("🔔 *{}* \n\n", inside_bold(&run.name));
    text.push_str(&format!("💼 *Status*: {}\n", status.label()));
    text.push_str(&format!(
        "🕒 *Completed in*: {}\n\n",
        compute_duration(run.created_at, run.updated_at)
    ));
    text.push_str("*Job Details:*\n");

    let lines: Vec<String> = jobs.iter().map(job_line).collect();
    let header_units = utf16_len(&text);

    // Largest prefix of job lines that fits together with its overflow note.
    let mut kept = 0;
    let mut used = header_units;
    for (index, line) in lines.iter().enumerate() {
        let with_line = used + utf16_len(line);
        let dropped = lines.len() - index - 1;
        let note = if dropped == 0 {
            0
        } else {
            utf16_len(&overflow_line(dropped))
        };
        if with_line + note > MAX_MESSAGE_UNITS {
            break;
        }
        used = with_line;
        kept = index + 1;
    }

    for line in &lines[..kept] {
        text.push_str(line);
    }
    if kept < lines.len() {
        text.push_str(&overflow_line(lines.len() - kept));
    }

    debug!(
        jobs = jobs.len(),
        rendered_jobs = kept,
        units = utf16_len(&text),
        "Message formatted"
    );
    OutgoingMessage::markdown(text)
}

fn job_line(job: &Job) -> String {
    format!(
        "{} `{}` ({})\n",
        status_icon(job.conclusion.as_ref()),
        inside_code(&job.name),
        job_elapsed(job)
    )
}

fn overflow_line(dropped: usize) -> String {
    let noun = if dropped == 1 { "job" } else { "jobs" };
    format!("…and {dropped} more {noun}\n")
}

fn inside_bold(name: &str) -> String {
    clip(name).replace('*', "∗")
}

fn inside_code(name: &str) -> String {
    clip(name).replace('`', "'")
}

fn clip(name: &str) -> String {
    if name.chars().count() <= MAX_NAME_CHARS {
        return name.to_string();
    }
    let mut clipped: String = name.chars().take(MAX_NAME_CHARS - 1).collect();
    clipped.push('…');
    clipped
}

fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}
