//! `attune profile`: set and show the profile the coach personalises with.

use anyhow::Result;
use attune_core::repository::profile::ProfileRepository;
use attune_types::profile::{Preferences, Profile};
use console::style;

use crate::state::AppState;

/// Flags from `attune profile set`.
pub struct ProfileUpdate {
    pub goals: Vec<String>,
    pub struggles: Vec<String>,
    pub style: Option<String>,
    pub reduce_overwhelm: bool,
    pub context: Option<String>,
}

impl ProfileUpdate {
    fn into_profile(self, owner_id: &str) -> Profile {
        Profile {
            owner_id: owner_id.to_string(),
            goals: self.goals,
            struggles: self.struggles,
            preferences: Preferences {
                communication_style: self.style,
                reduce_overwhelm: self.reduce_overwhelm,
            },
            work_study_context: self.context,
        }
    }
}

pub async fn set(state: &AppState, user: &str, update: ProfileUpdate, json: bool) -> Result<()> {
    let profile = update.into_profile(user);
    state.profiles.upsert(&profile).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        println!();
        println!(
            "  {} Profile saved for '{}'",
            style("✓").green().bold(),
            style(user).cyan()
        );
        println!();
    }
    Ok(())
}

pub async fn show(state: &AppState, user: &str, json: bool) -> Result<()> {
    let profile = state
        .profiles
        .get(user)
        .await?
        .unwrap_or_else(|| Profile::empty(user));

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
        return Ok(());
    }

    println!();
    println!("  Profile for '{}'", style(user).cyan().bold());
    println!();
    println!("  {:<20} {}", style("Goals").dim(), profile.goals_line());
    println!("  {:<20} {}", style("Struggles").dim(), profile.struggles_line());
    println!("  {:<20} {}", style("Style").dim(), profile.communication_style());
    println!(
        "  {:<20} {}",
        style("Reduce overwhelm").dim(),
        if profile.preferences.reduce_overwhelm { "yes" } else { "no" }
    );
    if let Some(context) = &profile.work_study_context {
        println!("  {:<20} {}", style("Context").dim(), context);
    }
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_maps_onto_profile() {
        let profile = ProfileUpdate {
            goals: vec!["finish thesis".to_string()],
            struggles: vec![],
            style: Some("direct".to_string()),
            reduce_overwhelm: true,
            context: None,
        }
        .into_profile("u1");

        assert_eq!(profile.owner_id, "u1");
        assert_eq!(profile.communication_style(), "direct");
        assert!(profile.preferences.reduce_overwhelm);
        assert_eq!(profile.struggles_line(), "Not specified");
    }
}
