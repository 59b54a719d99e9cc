use crate::systems::{MatchPolicy, System};
use crate::components::InstanceBuilder;
use crate::entities::EntityType;
use crate::error::EcsError;
use std::cell::RefCell;
use std::rc::Rc;

fn counter_builder() -> InstanceBuilder {
	let mut builder = InstanceBuilder::new();
	builder
		.add("a", || 0_i32)
		.unwrap()
		.add("b", || 0_i32)
		.unwrap()
		.add("value", || 0_i32)
		.unwrap();
	builder
}

#[test]
pub fn names_are_validated() {
	assert!(System::<()>::new(Vec::<String>::new()).is_ok());
	assert!(matches!(System::<()>::new(["a", ""]), Err(EcsError::InvalidName)));
	assert!(matches!(
		System::<()>::new(["a", "b", "a"]),
		Err(EcsError::DuplicateComponent(name)) if name == "a"
	));

	let system = System::<()>::new(["b", "a"]).unwrap();
	assert_eq!(system.components(), ["b", "a"], "Declaration order was not kept");
}

#[test]
pub fn unbound_system_is_unimplemented() {
	let system = System::<()>::new(["a"]).unwrap();
	assert!(!system.is_bound());
	assert!(matches!(system.dispatch(&()), Err(EcsError::Unimplemented(id)) if id == system.id()));
}

#[test]
pub fn first_bind_wins() {
	let calls = Rc::new(RefCell::new(Vec::new()));
	let pool = EntityType::build(1, &counter_builder(), []).unwrap();
	let system = System::<()>::new(["a"]).unwrap();
	system.add(&pool.acquire().unwrap());

	let first = calls.clone();
	assert!(system.bind(move |_, _, _| first.borrow_mut().push("first")));
	let second = calls.clone();
	assert!(!system.bind(move |_, _, _| second.borrow_mut().push("second")), "Callback was rebound");

	system.dispatch(&()).unwrap();
	assert_eq!(*calls.borrow(), ["first"]);
}

#[test]
pub fn dispatch_counts_members_once_per_frame() {
	let system = System::<()>::with_callback(["a", "b"], |_, entity, _| {
		*entity.get_mut::<i32>("value").unwrap() += 1;
	})
	.unwrap();
	let pool = EntityType::build(8, &counter_builder(), [system.subscriber()]).unwrap();

	let entity = pool.acquire().unwrap();
	system.dispatch(&()).unwrap();
	assert_eq!(*entity.get::<i32>("value").unwrap(), 1);

	entity.free();
	system.dispatch(&()).unwrap();
	assert_eq!(*entity.get::<i32>("value").unwrap(), 1, "Freed entity was still visited");
}

#[test]
pub fn frame_arguments_are_forwarded() {
	let system = System::<f32>::with_callback(["value"], |system, entity, dt| {
		assert!(system.is_locked(), "System is not locked while dispatching");
		*entity.get_mut::<i32>("value").unwrap() += (*dt * 10.0) as i32;
	})
	.unwrap();
	let pool = EntityType::build(2, &counter_builder(), [system.subscriber()]).unwrap();
	let entities = [pool.acquire().unwrap(), pool.acquire().unwrap()];

	system.dispatch(&0.5).unwrap();
	system.dispatch(&0.2).unwrap();

	assert!(!system.is_locked());
	for entity in &entities {
		assert_eq!(*entity.get::<i32>("value").unwrap(), 7);
	}
}

#[test]
pub fn members_are_visited_in_subscription_order() {
	let visited = Rc::new(RefCell::new(Vec::new()));
	let log = visited.clone();
	let system = System::<()>::with_callback(["a"], move |_, entity, _| log.borrow_mut().push(entity.index())).unwrap();
	let pool = EntityType::build(3, &counter_builder(), [system.subscriber()]).unwrap();

	let entities = (0..3).map(|_| pool.acquire().unwrap()).collect::<Vec<_>>();
	entities[0].free();
	pool.acquire().unwrap();

	system.dispatch(&()).unwrap();
	assert_eq!(*visited.borrow(), [1_u32, 2, 0]);
}

#[test]
pub fn wiring_follows_the_match_policy() {
	let shares_one = System::<()>::new(["a", "sprite"]).unwrap();
	let requires_all = System::<()>::with_policy(["a", "sprite"], MatchPolicy::Subset).unwrap();
	let subset = System::<()>::with_policy(["a", "b"], MatchPolicy::Subset).unwrap();
	let unrelated = System::<()>::new(["sprite"]).unwrap();

	let pool = EntityType::build(
		2,
		&counter_builder(),
		[
			shares_one.subscriber(),
			requires_all.subscriber(),
			subset.subscriber(),
			unrelated.subscriber(),
			subset.subscriber(),
		],
	)
	.unwrap();

	assert!(pool.is_wired(&shares_one.subscriber()));
	assert!(!pool.is_wired(&requires_all.subscriber()));
	assert!(pool.is_wired(&subset.subscriber()));
	assert!(!pool.is_wired(&unrelated.subscriber()));

	let entity = pool.acquire().unwrap();
	assert_eq!(shares_one.entities().len(), 1);
	assert_eq!(subset.entities().len(), 1, "Duplicate wiring subscribed the entity twice");
	assert!(requires_all.is_empty());
	assert!(unrelated.is_empty(), "Unrelated system received an entity");

	entity.free();
	assert!(shares_one.is_empty() && subset.is_empty(), "Freed entity is still subscribed");
}

#[test]
pub fn live_removal_of_a_non_member_fails() {
	let system = System::<()>::new(["a"]).unwrap();
	let pool = EntityType::build(1, &counter_builder(), []).unwrap();
	let entity = pool.acquire().unwrap();

	assert!(matches!(system.remove(&entity), Err(EcsError::NotFound { .. })));
	system.add(&entity);
	assert!(system.contains(&entity));
	system.remove(&entity).unwrap();
	assert!(system.is_empty());
}

#[test]
pub fn dropped_systems_are_skipped() {
	let system = System::<()>::new(["a"]).unwrap();
	let pool = EntityType::build(2, &counter_builder(), [system.subscriber()]).unwrap();
	let subscriber = system.subscriber();
	drop(system);
	drop(subscriber);

	let entity = pool.acquire().expect("Acquire failed after the system was dropped");
	entity.free();
	assert_eq!(pool.free_count(), 2);
}
