use crate::components::InstanceBuilder;
use crate::entities::EntityType;
use crate::systems::System;
use crate::error::EcsError;
use std::collections::HashSet;
use std::cell::RefCell;
use std::rc::Rc;

fn rectangle() -> InstanceBuilder {
	let mut builder = InstanceBuilder::new();
	builder.add("a", || 7_i32).unwrap().add("b", || 12_i32).unwrap();
	builder
}

#[test]
pub fn fresh_pool_is_entirely_free() {
	for capacity in 1..16 {
		let pool = EntityType::build(capacity, &rectangle(), []).unwrap();
		assert_eq!(pool.capacity(), capacity);
		assert_eq!(pool.free_count(), capacity, "Fresh pool has entities in use");
		assert_eq!(pool.used_count(), 0);
		assert!(pool.used().is_empty());
	}
}

#[test]
pub fn zero_capacity_is_rejected() {
	assert!(matches!(
		EntityType::build(0, &rectangle(), []),
		Err(EcsError::InvalidCapacity(0))
	));
}

#[test]
pub fn oversized_capacity_is_out_of_range() {
	let capacity = u32::MAX as usize;
	let error = EntityType::build(capacity, &rectangle(), []).unwrap_err();
	assert!(matches!(error, EcsError::InvalidCapacity(c) if c == capacity));

	let message = error.to_string();
	assert!(message.contains("out of range"), "Unexpected message: {message}");
	assert!(!message.contains("greater than zero"), "Oversized capacity reported as zero: {message}");
}

#[test]
pub fn acquire_until_exhausted() {
	let capacity = 8;
	let pool = EntityType::build(capacity, &rectangle(), []).unwrap();

	let mut acquired = HashSet::new();
	for i in 0..capacity {
		let entity = pool.acquire().expect("Pool ran out early");
		assert!(acquired.insert(entity), "Entity was handed out twice");
		assert_eq!(pool.used_count(), i + 1);
		assert_eq!(pool.free_count() + pool.used_count(), capacity, "Partitions lost an entity");
	}

	assert!(pool.acquire().is_none(), "Exhausted pool handed out an entity");
	assert_eq!(pool.capacity(), capacity, "Pool grew");
}

#[test]
pub fn freed_entity_is_reused_first() {
	let pool = EntityType::build(1, &rectangle(), []).unwrap();

	let first = pool.acquire().unwrap();
	first.free();
	let second = pool.acquire().unwrap();
	assert_eq!(first, second, "Freed entity was not reused");

	let pool = EntityType::build(4, &rectangle(), []).unwrap();
	let entities = (0..4).map(|_| pool.acquire().unwrap()).collect::<Vec<_>>();
	entities[1].free();
	entities[3].free();
	assert_eq!(pool.acquire().unwrap(), entities[3], "Most recently freed entity was not reused first");
	assert_eq!(pool.acquire().unwrap(), entities[1]);
}

#[test]
pub fn free_is_idempotent() {
	let pool = EntityType::build(4, &rectangle(), []).unwrap();
	let entity = pool.acquire().unwrap();
	let _other = pool.acquire().unwrap();

	pool.free(&entity).unwrap();
	assert_eq!((pool.free_count(), pool.used_count()), (3, 1));
	assert!(!entity.is_acquired());

	pool.free(&entity).unwrap();
	entity.free();
	assert_eq!((pool.free_count(), pool.used_count()), (3, 1), "Second free changed the pool");

	assert_eq!(pool.acquire().unwrap(), entity);
	assert!(pool.acquire().is_some());
	assert!(pool.acquire().is_some());
	assert!(pool.acquire().is_none(), "Double free duplicated an entity");
}

#[test]
pub fn foreign_entities_are_rejected() {
	let pool = EntityType::build(1, &rectangle(), []).unwrap();
	let other = EntityType::build(1, &rectangle(), []).unwrap();
	let entity = other.acquire().unwrap();

	assert!(matches!(pool.free(&entity), Err(EcsError::ForeignEntity { .. })));
	assert!(entity.is_acquired(), "Foreign free released the entity");
}

#[test]
pub fn pool_does_not_reset_components() {
	let pool = EntityType::build(8, &rectangle(), []).unwrap();

	let entity = pool.acquire().unwrap();
	assert_eq!(*entity.get::<i32>("a").unwrap(), 7);
	assert_eq!(*entity.get::<i32>("b").unwrap(), 12);

	*entity.get_mut::<i32>("a").unwrap() = 1;
	entity.free();

	let entity = pool.acquire().unwrap();
	assert_eq!(*entity.get::<i32>("a").unwrap(), 1, "Component was reset implicitly");
	assert_eq!(*entity.get::<i32>("b").unwrap(), 12);
}

#[test]
pub fn entities_never_share_components() {
	let pool = EntityType::build(2, &rectangle(), []).unwrap();
	let first = pool.acquire().unwrap();
	let second = pool.acquire().unwrap();

	*first.get_mut::<i32>("a").unwrap() += 100;
	assert_eq!(*first.get::<i32>("a").unwrap(), 107);
	assert_eq!(*second.get::<i32>("a").unwrap(), 7, "Component instance is shared");
}

#[test]
pub fn hooks_run_after_subscription() {
	let system = System::<()>::new(["a"]).unwrap();
	let pool = EntityType::build(2, &rectangle(), [system.subscriber()]).unwrap();
	let log = Rc::new(RefCell::new(Vec::new()));

	let (acquired, observer) = (log.clone(), system.clone());
	pool.on_acquire(move |entity| {
		assert!(observer.contains(entity), "Hook ran before subscription");
		*entity.get_mut::<i32>("a").unwrap() = 0;
		acquired.borrow_mut().push(("acquire", entity.index()));
	});

	let freed = log.clone();
	pool.on_free(move |entity| freed.borrow_mut().push(("free", entity.index())));

	let entity = pool.acquire().unwrap();
	assert_eq!(*entity.get::<i32>("a").unwrap(), 0, "Acquire hook did not run");
	entity.free();
	entity.free();

	assert_eq!(*log.borrow(), [("acquire", 0), ("free", 0)]);
}

#[test]
pub fn hooks_can_replace_themselves() {
	let pool = EntityType::build(2, &rectangle(), []).unwrap();
	let handle = pool.clone();
	pool.on_acquire(move |_| handle.on_acquire(|entity| *entity.get_mut::<i32>("b").unwrap() = -1));

	let first = pool.acquire().unwrap();
	let second = pool.acquire().unwrap();
	assert_eq!(*first.get::<i32>("b").unwrap(), 12);
	assert_eq!(*second.get::<i32>("b").unwrap(), -1);
}
