//! The full stack, driven through the facade prelude.

use wend::prelude::*;
use wend_test_utils::{MockWorld, ScriptedSearch};

#[test]
fn plan_and_first_move_through_the_prelude() {
    let mut world = MockWorld::new();
    let region = RegionId::new(0, 0);
    world.add_obstacle(
        region,
        Obstacle {
            x: 10,
            y: 10,
            kind: ObstacleKind::Container,
            owned: true,
            public: false,
        },
    );

    let mut cache = CostCache::new(CostOverrides::default(), CacheConfig::default()).unwrap();
    let finder = RouteFinder::new(RouteConfig::default()).unwrap();
    let mut follower = PathFollower::new(FollowConfig::default()).unwrap();
    let search = ScriptedSearch::new();

    let start = Position::new(region, 5, 5);
    let goal = Position::new(region, 8, 5);
    search.push_walk(start, &[Direction::East, Direction::East, Direction::East]);

    let dir = follower
        .next_move(
            &mut world,
            &mut cache,
            &finder,
            &search,
            StepId(1),
            AgentId(1),
            start,
            goal,
            &RouteRequest::default(),
        )
        .unwrap();

    assert_eq!(dir, Direction::East);
    assert_eq!(follower.state(AgentId(1)).unwrap().state(), FollowState::Following);
    // The search saw the cached grid with the structure cost in place.
    let grid = cache
        .costs(&world, StepId(1), region, &CostRequest::default())
        .unwrap();
    assert_eq!(grid.get(10, 10).unwrap(), 5);
}
