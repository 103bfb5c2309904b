//! Integration tests for lineup editing: offered choices, assignment, formation changes.

use soccer_meetup_web::{
    assign, assign_exclusive, available_players, release_stale, render_lineup, render_slot,
    resize_formation, Choice, Formation, Lineup, LineupError, Quarter,
};

fn lineup() -> Lineup {
    Lineup::empty("2026-03-07 Riverside", Quarter::new(1).unwrap())
}

fn confirmed(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn labels(choices: &[Choice]) -> Vec<&str> {
    choices.iter().map(Choice::label).collect()
}

fn player(name: &str) -> Choice {
    Choice::Player(name.to_string())
}

#[test]
fn default_lineup_has_goalkeeper_and_formation_slots() {
    let l = lineup();
    assert_eq!(l.formation, Formation::default());
    let ids: Vec<&str> = l.slots.iter().map(|s| s.slot_id.as_str()).collect();
    assert_eq!(
        ids,
        ["gk", "df_1", "df_2", "df_3", "df_4", "mf_1", "mf_2", "mf_3", "mf_4", "fw_1", "fw_2"]
    );
    assert!(l.slots.iter().all(|s| !s.is_assigned()));
}

#[test]
fn players_held_elsewhere_are_not_offered() {
    let mut l = lineup();
    let c = confirmed(&["A", "B", "C"]);
    assign(&mut l, "df_1", player("A"), None).unwrap();
    assign(&mut l, "df_2", player("B"), None).unwrap();

    let other = available_players(&l, "df_3", &c).unwrap();
    assert_eq!(other, vec![Choice::Unassigned, player("C")]);
    assert_eq!(labels(&other), ["미배정", "C"]);

    let own = available_players(&l, "df_1", &c).unwrap();
    assert_eq!(labels(&own), ["미배정", "A", "C"]);
}

#[test]
fn offered_names_follow_arrival_order() {
    let l = lineup();
    let c = confirmed(&["Zed", "Amy", "Kim"]);
    let choices = available_players(&l, "gk", &c).unwrap();
    assert_eq!(labels(&choices), ["미배정", "Zed", "Amy", "Kim"]);
}

#[test]
fn stale_holder_is_offered_only_to_its_own_slot() {
    let mut l = lineup();
    let c = confirmed(&["A", "B"]);
    assign(&mut l, "mf_1", player("C"), None).unwrap();

    assert_eq!(labels(&available_players(&l, "mf_2", &c).unwrap()), ["미배정", "A", "B"]);
    assert_eq!(labels(&available_players(&l, "mf_1", &c).unwrap()), ["미배정", "A", "B", "C"]);

    let view = render_slot(&l, "mf_1", &c).unwrap();
    assert_eq!(view.selected, player("C"));
    assert!(view.stale);
    assert!(!render_slot(&l, "mf_2", &c).unwrap().stale);
}

#[test]
fn stale_holder_is_released_after_render() {
    let mut l = lineup();
    let c = confirmed(&["A", "B"]);
    assign(&mut l, "gk", player("A"), None).unwrap();
    assign(&mut l, "mf_1", player("C"), Some("CAM")).unwrap();

    let released = release_stale(&mut l, &c);
    assert_eq!(released, ["mf_1"]);
    let mf = l.slot("mf_1").unwrap();
    assert_eq!(mf.assigned_player, None);
    assert_eq!(mf.assigned_role, None);
    assert_eq!(l.slot("gk").unwrap().assigned_player.as_deref(), Some("A"));
    assert!(release_stale(&mut l, &c).is_empty());
}

#[test]
fn assign_sets_default_role_and_unassigned_clears() {
    let mut l = lineup();
    assign(&mut l, "fw_1", player("A"), None).unwrap();
    assert_eq!(l.slot("fw_1").unwrap().assigned_role.as_deref(), Some("ST"));

    assign(&mut l, "fw_1", player("A"), Some("LW")).unwrap();
    assert_eq!(l.slot("fw_1").unwrap().assigned_role.as_deref(), Some("LW"));

    assign(&mut l, "fw_1", Choice::from("미배정"), None).unwrap();
    assert!(!l.slot("fw_1").unwrap().is_assigned());
}

#[test]
fn assign_rejects_unknown_slot_and_role() {
    let mut l = lineup();
    assert_eq!(
        assign(&mut l, "df_5", player("A"), None),
        Err(LineupError::InvalidSlot("df_5".to_string()))
    );
    assert!(matches!(
        assign(&mut l, "gk", player("A"), Some("ST")),
        Err(LineupError::InvalidRole { .. })
    ));
    assert!(!l.slot("gk").unwrap().is_assigned());
    assert!(matches!(
        available_players(&l, "xx", &confirmed(&["A"])),
        Err(LineupError::InvalidSlot(_))
    ));
}

#[test]
fn exclusive_assign_rejects_player_held_elsewhere() {
    let mut l = lineup();
    assign_exclusive(&mut l, "df_1", player("A"), None).unwrap();
    assert_eq!(
        assign_exclusive(&mut l, "df_2", player("A"), None),
        Err(LineupError::PlayerAlreadyAssigned {
            player: "A".to_string(),
            slot_id: "df_1".to_string(),
        })
    );
    // Re-assigning the same slot (e.g. changing role) is fine.
    assign_exclusive(&mut l, "df_1", player("A"), Some("LB")).unwrap();
    assign_exclusive(&mut l, "df_2", Choice::Unassigned, None).unwrap();
}

#[test]
fn shrinking_formation_drops_trailing_slots() {
    let mut l = lineup();
    for (i, name) in ["A", "B", "C", "D"].iter().enumerate() {
        assign(&mut l, &format!("df_{}", i + 1), player(name), None).unwrap();
    }
    assign(&mut l, "gk", player("G"), None).unwrap();

    resize_formation(&mut l, Formation::new(2, 5, 3).unwrap());

    assert_eq!(l.formation.to_string(), "2-5-3");
    assert_eq!(l.slot("df_1").unwrap().assigned_player.as_deref(), Some("A"));
    assert_eq!(l.slot("df_2").unwrap().assigned_player.as_deref(), Some("B"));
    assert!(l.slot("df_3").is_none());
    assert!(l.slot("df_4").is_none());
    assert!(!l.slot("mf_5").unwrap().is_assigned());
    assert!(!l.slot("fw_3").unwrap().is_assigned());
    assert_eq!(l.slot("gk").unwrap().assigned_player.as_deref(), Some("G"));
    assert_eq!(l.slots.len(), 11);

    resize_formation(&mut l, Formation::new(4, 4, 2).unwrap());
    assert!(!l.slot("df_3").unwrap().is_assigned());
    assert_eq!(l.slots[0].slot_id, "gk");
    assert_eq!(l.slots[1].slot_id, "df_1");
}

#[test]
fn formation_strings() {
    assert_eq!("4-3-3".parse::<Formation>().unwrap(), Formation::new(4, 3, 3).unwrap());
    assert_eq!(" 3 - 5 - 2 ".parse::<Formation>().unwrap().to_string(), "3-5-2");
    for bad in ["", "4-4", "4-4-2-1", "a-b-c", "0-5-5", "7-2-1", "5-5-5"] {
        assert!(
            matches!(bad.parse::<Formation>(), Err(LineupError::MalformedFormation(_))),
            "{bad:?} should be rejected"
        );
    }
}

#[test]
fn quarter_strings() {
    assert_eq!("Q3".parse::<Quarter>().unwrap().number(), 3);
    assert_eq!("2".parse::<Quarter>().unwrap().to_string(), "Q2");
    assert!(matches!("Q5".parse::<Quarter>(), Err(LineupError::InvalidQuarter(_))));
    assert!(Quarter::new(0).is_err());
}

#[test]
fn rendered_lineup_never_offers_a_player_twice_across_slots() {
    let mut l = lineup();
    let c = confirmed(&["A", "B", "C", "D"]);
    assign(&mut l, "gk", player("A"), None).unwrap();
    assign(&mut l, "fw_2", player("D"), None).unwrap();
    let views = render_lineup(&l, &c);
    assert_eq!(views.len(), l.slots.len());
    for v in &views {
        let holders_offered = v
            .options
            .iter()
            .filter(|o| matches!(o.player(), Some("A") | Some("D")))
            .count();
        let own = usize::from(v.selected != Choice::Unassigned);
        assert_eq!(holders_offered, own, "slot {}", v.slot_id);
    }
}

#[test]
fn role_picked_before_player_is_kept() {
    let mut l = lineup();
    assign(&mut l, "df_1", Choice::Unassigned, Some("LB")).unwrap();
    let df = l.slot("df_1").unwrap();
    assert!(!df.is_assigned());
    assert_eq!(df.assigned_role.as_deref(), Some("LB"));

    assign(&mut l, "df_1", player("A"), None).unwrap();
    let df = l.slot("df_1").unwrap();
    assert_eq!(df.assigned_player.as_deref(), Some("A"));
    assert_eq!(df.assigned_role.as_deref(), Some("LB"));
}

#[test]
fn changing_player_keeps_stored_role() {
    let mut l = lineup();
    assign(&mut l, "mf_2", player("A"), Some("CAM")).unwrap();
    assign(&mut l, "mf_2", player("B"), None).unwrap();
    assert_eq!(l.slot("mf_2").unwrap().assigned_role.as_deref(), Some("CAM"));
    assert!(matches!(
        assign(&mut l, "mf_2", Choice::Unassigned, Some("GK")),
        Err(LineupError::InvalidRole { .. })
    ));
    assert_eq!(l.slot("mf_2").unwrap().assigned_player.as_deref(), Some("B"));
}
