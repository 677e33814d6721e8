//! Prompt and context construction for the recommendation conversation.
//!
//! Pure string building: no I/O. The context gives the generator the
//! student's record and, per degree, what each requirement section still
//! needs.

use advisor_data::models::{CourseRecord, TranscriptRecord};

use crate::catalog::format_credits;
use crate::code::CourseCode;
use crate::degree::DegreeReconciliation;
use crate::transcript::Grade;

use super::generator::Message;

/// Standing instructions for the generator.
pub const INSTRUCTION_PROMPT: &str = "\
You are a university academic advisor planning a student's next semester.

RULES:
- Recommend only courses the student has not completed.
- Prefer courses listed under unfinished degree requirements.
- Every recommended course must have its prerequisites met by completed courses.
- The total credits must not exceed the requested amount and may fall short of it by at most 3.
- Refer to courses as \"SUBJ NNNNN - Course Title\".
";

/// The first user turn of every conversation.
pub const RECOMMEND_PROMPT: &str = "What courses do you recommend for the next semester? \
Place your recommendation between <recommendation> tags. ex. some text ... \
<recommendation> ONLY YOUR LIST OF RECOMMENDED COURSES </recommendation> ... some text";

/// A degree and its reconciliation, labeled for the context heading.
#[derive(Debug, Clone)]
pub struct DegreeContext {
    pub label: String,
    pub reconciliation: DegreeReconciliation,
}

/// Opening conversation: instructions, advising context, then the request
/// for `target_credits` credits.
pub fn initial_conversation(context: &str, target_credits: u32) -> Vec<Message> {
    vec![
        Message::system(INSTRUCTION_PROMPT),
        Message::system(context),
        Message::user(format!(
            "I want to take {target_credits} credits next semester. {RECOMMEND_PROMPT}"
        )),
    ]
}

/// Corrective feedback after a rejected plan. The rejection reason is
/// passed through verbatim.
pub fn rejection_feedback(recommended: &[CourseCode], reason: &str) -> String {
    let listed = recommended
        .iter()
        .map(CourseCode::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "\nYou Recommended: [{listed}]\nError: {reason}\nCreate a new list of recommended courses based on the error\n\n"
    )
}

fn grade_text(record: &CourseRecord, transfer: bool) -> String {
    let Some(raw) = record.grade.as_deref() else {
        return "no grade".to_string();
    };
    let parsed = if transfer {
        Grade::parse_transfer(raw)
    } else {
        raw.parse()
    };
    parsed.map_or_else(|_| raw.trim().to_string(), |g| g.to_string())
}

fn course_line(out: &mut String, indent: &str, record: &CourseRecord, grade: Option<String>) {
    out.push_str(&format!(
        "{indent}{} - {}",
        record.code_text(),
        record.title.as_deref().unwrap_or("(untitled)")
    ));
    match grade {
        Some(grade) => out.push_str(&format!(" ({grade})\n")),
        None => out.push('\n'),
    }
}

/// Render the advising context: student info, course history and the
/// reconciled requirements of every degree.
pub fn build_advising_context(transcript: &TranscriptRecord, degrees: &[DegreeContext]) -> String {
    let mut out = String::with_capacity(4096);

    out.push_str("[STUDENT INFO]\n");
    out.push_str(&format!(
        "Student Name: {}\n",
        transcript.name.as_deref().unwrap_or("unknown")
    ));
    out.push_str(&format!(
        "Major: {}\n",
        transcript.major.as_deref().unwrap_or("undeclared")
    ));
    if let Some(concentration) = transcript.concentration.as_deref().filter(|c| !c.is_empty()) {
        out.push_str(&format!("Concentration: {concentration}\n"));
    }
    out.push_str(&format!(
        "Completed Credits: {}\n",
        transcript.earned_credits.map_or("unknown".to_string(), format_credits)
    ));
    if let Some(gpa) = transcript.gpa {
        out.push_str(&format!("GPA: {gpa}\n"));
    }
    out.push_str("\n\n[STUDENT COURSES]\n");

    if !transcript.transfer.is_empty() {
        out.push_str("\nCompleted Courses (Transferred):\n");
        for record in &transcript.transfer {
            course_line(&mut out, "", record, Some(grade_text(record, true)));
        }
    }
    if !transcript.completed.is_empty() {
        out.push_str("\nCompleted Courses:\n");
        for term in &transcript.completed {
            out.push_str(&format!("\nTerm: {}\n", term.term));
            for record in &term.courses {
                course_line(&mut out, "\t", record, Some(grade_text(record, false)));
            }
        }
    }
    if !transcript.inprogress.is_empty() {
        out.push_str("\nIn Progress Courses:\n");
        for term in &transcript.inprogress {
            out.push_str(&format!("\nTerm: {}\n", term.term));
            for record in &term.courses {
                course_line(&mut out, "\t", record, None);
            }
        }
    }
    out.push_str("\n\n");

    for degree in degrees {
        out.push_str(&format!(
            "[DEGREE REQUIREMENTS FOR {}]\n",
            degree.label.to_uppercase()
        ));
        for section in &degree.reconciliation.sections {
            let heading = section.name.replace("s.h.", "credits needed");
            if section.is_complete {
                out.push_str(&format!("{heading}: \ncompleted\n"));
            } else {
                out.push_str(&format!(
                    "{heading} ({} credits taken)\n",
                    format_credits(section.completed_credits)
                ));
                for (code, course) in &section.outstanding {
                    let credits = course
                        .credits
                        .map_or_else(|| "credits not specified".to_string(), format_credits);
                    out.push_str(&format!("- {code} - {} ({credits})\n", course.title));
                }
            }
            out.push('\n');
        }
    }

    out
}
