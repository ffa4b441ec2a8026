//! `attune assess` and `attune assessment`: submit and show screenings.

use anyhow::{Context, Result, bail};
use attune_types::assessment::{Answer, Assessment, AssessmentExplanation, AssessmentKind};
use console::style;
use uuid::Uuid;

use crate::state::AppState;

/// Highest value on the ASRS answer scale ("very often").
const MAX_ANSWER: u8 = 4;

pub async fn submit(
    state: &AppState,
    user: &str,
    kind: &str,
    answers: &str,
    json: bool,
) -> Result<()> {
    let kind: AssessmentKind = kind.parse().map_err(anyhow::Error::msg)?;
    let answers = parse_answers(kind, answers)?;

    let profile = state.assistant.profile(user).await?;
    let submitted = state
        .assistant
        .submit_assessment(user, kind, answers, &profile)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&submitted)?);
        return Ok(());
    }

    print_assessment(&submitted.assessment);
    print_explanation_extras(&submitted.explanation);
    if let Some(err) = &submitted.memory_write_error {
        println!("  {} memory not saved: {err}", style("!").yellow().bold());
        println!();
    }
    Ok(())
}

pub async fn show(state: &AppState, user: &str, id: &str, json: bool) -> Result<()> {
    let id = Uuid::parse_str(id).with_context(|| format!("'{id}' is not an assessment id"))?;
    let Some(assessment) = state.assistant.get_assessment(user, &id).await? else {
        bail!("assessment '{id}' not found");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&assessment)?);
    } else {
        print_assessment(&assessment);
    }
    Ok(())
}

/// Parse `"1,3,4"` into answers with ids `{kind}_{n}` (1-based).
fn parse_answers(kind: AssessmentKind, raw: &str) -> Result<Vec<Answer>> {
    let answers = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .enumerate()
        .map(|(i, value)| {
            let value: u8 = value
                .parse()
                .with_context(|| format!("answer {} ('{value}') is not a number", i + 1))?;
            if value > MAX_ANSWER {
                bail!("answer {} is {value}; answers range from 0 to {MAX_ANSWER}", i + 1);
            }
            Ok(Answer::new(format!("{kind}_{}", i + 1), value))
        })
        .collect::<Result<Vec<_>>>()?;

    if answers.is_empty() {
        bail!("no answers given");
    }
    Ok(answers)
}

fn print_assessment(assessment: &Assessment) {
    println!();
    println!(
        "  {} screening {}",
        style(assessment.kind.to_string().to_uppercase()).cyan().bold(),
        style(assessment.id).dim()
    );
    println!();
    println!("  {:<16} {}", style("Score").dim(), assessment.scores.total);
    if let (Some(inattention), Some(hyperactivity)) =
        (assessment.scores.inattention, assessment.scores.hyperactivity)
    {
        println!("  {:<16} {inattention}", style("Inattention").dim());
        println!("  {:<16} {hyperactivity}", style("Hyperactivity").dim());
    }
    if let Some(interpretation) = &assessment.interpretation {
        println!();
        println!("  {interpretation}");
    }
    print_list("Traits", &assessment.traits);
    print_list("Strategies", &assessment.recommendations);
    print_list("Ask your clinician", &assessment.questions_for_clinician);
    println!();
}

fn print_explanation_extras(explanation: &AssessmentExplanation) {
    println!("  {}", style(&explanation.disclaimer).dim().italic());
    println!();
}

fn print_list(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!();
    println!("  {}", style(title).bold());
    for item in items {
        println!("    - {item}");
    }
}
