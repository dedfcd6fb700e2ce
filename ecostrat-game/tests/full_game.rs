use ecostrat_game::{
    ActionId, Advance, BuiltinCatalog, GameConfig, GameEngine, GameError, GamePhase, GameSession,
    MissingActionPolicy, PlayerId, ScoreTier, SpeciesId, seeded_rng,
};

fn id(n: u32) -> PlayerId {
    PlayerId::new(n)
}

/// First catalog action that suits the species.
fn favored_action(catalog: &ecostrat_game::Catalog, species: SpeciesId) -> ActionId {
    catalog
        .suitable_actions(species)
        .map(|a| a.id)
        .next()
        .unwrap_or(ActionId::WaitAndObserve)
}

#[test]
fn four_round_game_from_engine_to_standings() {
    let engine = GameEngine::new(BuiltinCatalog);
    let config = engine.load_config("game").unwrap();
    let lobby = engine.new_lobby(config).unwrap();
    let mut selection = lobby.register_players(&["Alice", "", "Bob"]);
    selection.assign_species(id(1), SpeciesId::RSelected).unwrap();
    selection.assign_species(id(3), SpeciesId::KSelected).unwrap();

    let mut rng = seeded_rng(1337);
    let mut round = selection.start_game_autofill(&mut rng).unwrap();
    assert_eq!(round.state().players()[1].name, "Player 2");

    let done = loop {
        let catalog = round.state().catalog_handle();
        let seats = round.controller().seats().to_vec();
        for seat in seats {
            round
                .select_action(seat.player, favored_action(&catalog, seat.species))
                .unwrap();
        }
        round.set_reasoning(id(1), "grow fast").unwrap();
        let results = round.end_round().unwrap();
        let outcome = results.outcome();
        assert_eq!(outcome.results.len(), 8);
        assert!(outcome.results.values().all(|r| r.tier != ScoreTier::NoAction));
        assert_eq!(
            outcome.actions[&id(1)].reasoning.as_deref(),
            Some("grow fast")
        );
        match results.complete_round() {
            Advance::NextRound(next) => round = next,
            Advance::Complete(done) => break done,
        }
    };

    let standings = done.final_standings();
    assert_eq!(standings.rounds_played, 4);
    assert_eq!(standings.standings.len(), 8);
    assert!(standings.total_round_wins() >= 4);
    let scenario_ids: Vec<_> = standings
        .round_recaps
        .iter()
        .map(|r| r.scenario_id.as_str())
        .collect();
    assert_eq!(
        scenario_ids,
        vec!["forest-fire", "mature-forest", "fertile-meadow", "desert-edge"]
    );
    for standing in &standings.standings {
        // Every pick suits its species, so nobody drops below a solid payout.
        assert!(standing.player.total_score >= 4 * 70);
        assert!(standing.player.population >= 100);
    }
}

#[test]
fn forest_fire_example_round() {
    let config = GameConfig::default().with_roster_size(2).with_total_rounds(1);
    let mut selection = ecostrat_game::Lobby::with_builtin_catalog(config)
        .unwrap()
        .register_players(&["r", "K"]);
    selection.assign_species(id(1), SpeciesId::RSelected).unwrap();
    selection.assign_species(id(2), SpeciesId::KSelected).unwrap();
    let mut round = selection.start_game().unwrap();
    assert_eq!(round.scenario().id, "forest-fire");
    round.select_action(id(1), ActionId::ReproduceQuickly).unwrap();
    round.select_action(id(2), ActionId::InvestInOffspring).unwrap();

    let results = round.end_round().unwrap();
    let r = results.outcome().result(id(1)).unwrap();
    let k = results.outcome().result(id(2)).unwrap();
    assert_eq!((r.score, r.population_delta), (100, 30));
    assert_eq!((k.score, k.population_delta), (70, 5));
    assert_eq!(
        r.explanation,
        "Excellent strategy! Your r-selected species thrives in this environment using reproduce quickly."
    );
    assert_eq!(results.outcome().winners.as_slice(), &[id(1)]);

    let Advance::Complete(done) = results.complete_round() else {
        panic!("single round game should complete");
    };
    let session = GameSession::from(done);
    assert_eq!(session.phase(), GamePhase::GameComplete);
    assert_eq!(session.players()[0].population, 130);
    assert_eq!(session.players()[1].population, 105);
}

#[test]
fn reject_policy_never_reaches_scoring_with_gaps() {
    let config = GameConfig::default()
        .with_roster_size(2)
        .with_missing_action(MissingActionPolicy::Reject);
    let mut rng = seeded_rng(2);
    let mut round = ecostrat_game::Lobby::with_builtin_catalog(config)
        .unwrap()
        .register_players::<&str>(&[])
        .start_game_autofill(&mut rng)
        .unwrap();
    round.select_action(id(2), ActionId::BuildDefenses).unwrap();
    assert_eq!(
        round.finalize().unwrap_err(),
        GameError::ActionsPending {
            missing: vec![id(1)]
        }
    );
    round.select_action(id(1), ActionId::BuildDefenses).unwrap();
    assert!(round.finalize().is_ok());
}

#[test]
fn reset_from_mid_game_discards_progress() {
    let mut rng = seeded_rng(77);
    let mut round = ecostrat_game::Lobby::with_builtin_catalog(GameConfig::default())
        .unwrap()
        .register_players(&["Ada"])
        .start_game_autofill(&mut rng)
        .unwrap();
    for n in 1..=8 {
        round.select_action(id(n), ActionId::ConserveResources).unwrap();
    }
    let session = GameSession::from(round.end_round().unwrap().complete_round());
    assert_eq!(session.current_round(), 2);
    let session = session.reset();
    assert_eq!(session.phase(), GamePhase::SpeciesSelection);
    assert_eq!(session.current_round(), 0);
    assert!(session.last_outcome().is_none());
    assert!(session.players().iter().all(|p| p.species.is_none()));
    assert_eq!(session.players()[0].name, "Player 1");
}

#[test]
fn constructors_reject_invalid_inputs() {
    let mut raw: serde_json::Value =
        serde_json::to_value(ecostrat_game::Catalog::builtin().as_ref()).unwrap();
    raw["scenarios"] = serde_json::json!([]);
    assert!(serde_json::from_value::<ecostrat_game::Catalog>(raw).is_err());

    let zero_rounds = GameConfig::default().with_roster_size(1).with_total_rounds(0);
    assert!(ecostrat_game::Lobby::with_builtin_catalog(zero_rounds.clone()).is_err());
    let engine = GameEngine::new(BuiltinCatalog);
    assert!(engine.new_session(zero_rounds).is_err());
}
