//! Energy costs for each action type (§4.10).
//!
//! `Speak` and `Arrest` are parameterised costs owned by
//! [`crate::config::ConversationConfig`] and [`crate::config::LawConfig`]
//! respectively, and are charged inside [`crate::conversation::speak`] and
//! [`crate::law_enforcement::arrest`]; this table covers every other action.
//! All values are `u32` -- no floating point.
#[allow(clippy::match_same_arms)]
pub const fn energy_cost(action: oakhaven_types::ActionType) -> u32 {
    use oakhaven_types::ActionType;
    match action {
        ActionType::Move => 0,
        ActionType::Stop => 0,
        ActionType::Face => 0,
        ActionType::MoveTo => 0,
        ActionType::Speak => 0,
        ActionType::Sleep => 0,
        ActionType::Wake => 0,
        ActionType::EnterBuilding => 0,
        ActionType::ExitBuilding => 0,
        ActionType::Buy => 0,
        ActionType::CollectUbi => 0,
        ActionType::UseToilet => 0,
        ActionType::Eat => 0,
        ActionType::Drink => 0,
        ActionType::Inspect => 0,
        ActionType::Trade => 0,
        ActionType::Give => 0,
        ActionType::ApplyJob => 0,
        ActionType::QuitJob => 0,
        ActionType::ListJobs => 0,
        ActionType::WritePetition => 2,
        ActionType::VotePetition => 0,
        ActionType::ListPetitions => 0,
        ActionType::Depart => 0,
        ActionType::CollectBody => 3,
        ActionType::ProcessBody => 3,
        ActionType::Arrest => 0,
        ActionType::BookSuspect => 0,
        ActionType::Forage => 5,
        ActionType::GetReferralLink => 0,
        ActionType::ClaimReferrals => 0,
        ActionType::SubmitFeedback => 0,
    }
}

#[cfg(test)]
mod tests {
    use oakhaven_types::ActionType;

    use super::energy_cost;

    #[test]
    fn forage_costs_more_than_a_single_step() {
        assert!(energy_cost(ActionType::Forage) > energy_cost(ActionType::Move));
    }

    #[test]
    fn passive_queries_are_free() {
        assert_eq!(energy_cost(ActionType::ListJobs), 0);
        assert_eq!(energy_cost(ActionType::ListPetitions), 0);
        assert_eq!(energy_cost(ActionType::Inspect), 0);
    }
}
