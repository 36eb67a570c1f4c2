use proptest::prelude::*;

use transit_shared::{
    Experience, ItemStack, MovementMode, RestoreOptions, Snapshot, StatusEffect, TravelerKind,
    Vitals,
};
use transit_test::{TestWorld, TravelerBuilder};

fn damaged_vitals() -> Vitals {
    Vitals {
        health: 12.5,
        remaining_air: 150,
        fire_ticks: -20,
        food_level: -5,
        exhaustion: 1.5,
        saturation: 2.0,
    }
}

#[test]
fn rider_state_survives_capture_and_restore() {
    let mut world = TestWorld::new();
    let armor = vec![
        Some(ItemStack::new("iron_helmet", 1).with_damage(3)),
        None,
        None,
        Some(ItemStack::new("leather_boots", 1)),
    ];
    let source = world.spawn(
        TravelerBuilder::rider("P")
            .vitals(damaged_vitals())
            .movement_mode(MovementMode::Creative)
            .held_slot(4)
            .item(0, ItemStack::new("stone", 64))
            .item(2, ItemStack::new("iron_sword", 1).with_damage(10))
            .armor(armor.clone())
            .experience(Experience::new(7, 0.25))
            .effect(StatusEffect::new("speed", 1, 200))
            .build(),
    );

    let snapshot = Snapshot::capture(&world, &source, TravelerKind::Rider, Some(&source))
        .expect("rider should be captured");

    let target = world.spawn(
        TravelerBuilder::rider("Q")
            .item(1, ItemStack::new("dirt", 3))
            .effect(StatusEffect::new("poison", 0, 100))
            .build(),
    );
    snapshot.restore(&mut world, &target, Some(&target), &RestoreOptions::default());

    let original = world.get(&source).expect("source exists").clone();
    let restored = world.get(&target).expect("target exists");

    // food is clamped, fire ticks are not
    assert_eq!(
        restored.vitals,
        Some(Vitals {
            food_level: 0,
            ..damaged_vitals()
        })
    );
    assert_eq!(restored.movement_mode, MovementMode::Creative);
    assert_eq!(restored.held_slot, 4);
    assert_eq!(restored.inventory, original.inventory);
    assert_eq!(restored.inventory[1], None);
    assert_eq!(restored.armor, armor);
    assert_eq!(restored.experience, Experience::new(7, 0.25));
    assert_eq!(restored.effects, vec![StatusEffect::new("speed", 1, 200)]);
}

#[test]
fn vitals_are_left_alone_when_not_requested() {
    let mut world = TestWorld::new();
    let source = world.spawn(TravelerBuilder::rider("P").vitals(damaged_vitals()).build());
    let snapshot = Snapshot::capture(&world, &source, TravelerKind::Rider, Some(&source))
        .expect("rider should be captured");

    let target = world.spawn(TravelerBuilder::rider("Q").build());
    let before = world.get(&target).and_then(|t| t.vitals);

    snapshot.restore(
        &mut world,
        &target,
        Some(&target),
        &RestoreOptions { vitals: false },
    );

    assert_eq!(world.get(&target).and_then(|t| t.vitals), before);
}

#[test]
fn cargo_belongs_to_the_vehicle() {
    let mut world = TestWorld::new();
    let cart = world.spawn(
        TravelerBuilder::vehicle(TravelerKind::StorageCart)
            .item(0, ItemStack::new("coal", 32))
            .item(26, ItemStack::new("rail", 16))
            .build(),
    );

    let snapshot = Snapshot::capture(&world, &cart, TravelerKind::StorageCart, None)
        .expect("cart should be captured");
    assert!(snapshot.rider.is_none());
    assert_eq!(snapshot.cargo.as_ref().map(|cargo| cargo.len()), Some(27));

    let fresh = world.spawn(TravelerBuilder::vehicle(TravelerKind::StorageCart).build());
    snapshot.restore(&mut world, &fresh, None, &RestoreOptions::default());

    assert_eq!(
        world.get(&fresh).map(|t| t.inventory.clone()),
        world.get(&cart).map(|t| t.inventory.clone())
    );
}

#[test]
fn plain_vehicles_have_no_cargo() {
    let mut world = TestWorld::new();
    let boat = world.spawn(TravelerBuilder::vehicle(TravelerKind::Boat).build());

    let snapshot =
        Snapshot::capture(&world, &boat, TravelerKind::Boat, None).expect("boat is captured");

    assert!(snapshot.cargo.is_none());
    assert!(snapshot.rider.is_none());
}

#[test]
fn capture_fails_for_missing_rider() {
    let world = TestWorld::new();
    let missing = transit_shared::TravelerId::from_u64(404);

    assert!(Snapshot::capture(&world, &missing, TravelerKind::Rider, Some(&missing)).is_err());
}

proptest! {
    #[test]
    fn prop_restored_vitals_are_never_negative(
        health in -20.0f64..20.0,
        air in -300i32..300,
        food in -20i32..20,
        fire in -100i32..100,
        level in -10i32..30,
    ) {
        let mut world = TestWorld::new();
        let vitals = Vitals {
            health,
            remaining_air: air,
            fire_ticks: fire,
            food_level: food,
            exhaustion: 0.0,
            saturation: 0.0,
        };
        let source = world.spawn(
            TravelerBuilder::rider("P")
                .vitals(vitals)
                .experience(Experience::new(level, 0.5))
                .build(),
        );
        let snapshot = Snapshot::capture(&world, &source, TravelerKind::Rider, Some(&source)).unwrap();

        let target = world.spawn(TravelerBuilder::rider("Q").build());
        snapshot.restore(&mut world, &target, Some(&target), &RestoreOptions::default());

        let restored = world.get(&target).unwrap();
        let restored_vitals = restored.vitals.unwrap();
        prop_assert_eq!(restored_vitals.health, health.max(0.0));
        prop_assert_eq!(restored_vitals.remaining_air, air.max(0));
        prop_assert_eq!(restored_vitals.food_level, food.max(0));
        prop_assert_eq!(restored_vitals.fire_ticks, fire);
        prop_assert_eq!(restored.experience.level, level.max(0));
    }
}
