//! Concurrent access worldtest
//!
//! Generation runs at most once per coordinate no matter how many threads
//! ask for it, and parallel pregeneration yields the same world as a
//! sequential walk.

use std::sync::{Arc, Barrier};
use std::thread;

use voxelgen_world::pregen::positions_around;
use voxelgen_world::{
    pregenerate, BlockType, ChunkPos, ChunkState, ChunkStore, TerrainGenerator, WorldConfig,
};

#[test]
fn two_threads_share_one_generation() {
    let store = Arc::new(ChunkStore::new(WorldConfig::with_seed(12345)).unwrap());
    let barrier = Arc::new(Barrier::new(2));

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let chunk = store.get_or_generate_chunk(ChunkPos::new(3, 3));
                let blocks = chunk.read().unwrap().sorted_blocks();
                (chunk, blocks)
            })
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert!(Arc::ptr_eq(&results[0].0, &results[1].0));
    assert_eq!(results[0].1.len(), results[1].1.len());
    assert_eq!(results[0].1, results[1].1);
    assert_eq!(store.stats().generated, 1);
}

#[test]
fn many_threads_hammering_one_chunk() {
    let store = ChunkStore::new(WorldConfig::with_seed(4)).unwrap();
    thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                for _ in 0..4 {
                    store.get_or_generate_chunk(ChunkPos::new(-2, 7));
                }
            });
        }
    });
    assert_eq!(store.stats().generated, 1);
    assert_eq!(store.chunk_state(ChunkPos::new(-2, 7)), ChunkState::Clean);
}

#[test]
fn concurrent_edits_in_one_chunk_all_land() {
    let store = ChunkStore::new(WorldConfig::with_seed(6)).unwrap();
    thread::scope(|scope| {
        for t in 0..4 {
            let store = &store;
            scope.spawn(move || {
                for i in 0..16 {
                    store.set_block(i, 150 + t, 3, BlockType::Glass).unwrap();
                }
            });
        }
    });

    for t in 0..4 {
        for i in 0..16 {
            assert_eq!(store.get_block(i, 150 + t, 3), BlockType::Glass);
        }
    }
    assert_eq!(store.stats().generated, 1);
    assert_eq!(store.chunk_state(ChunkPos::new(0, 0)), ChunkState::Dirty);
}

#[test]
fn parallel_pregeneration_matches_sequential() {
    let config = WorldConfig::with_seed(8080);
    let store = ChunkStore::new(config.clone()).unwrap();
    let positions = positions_around(ChunkPos::new(1, -1), 2);

    let report = pregenerate(&store, positions.clone(), Some(4));
    assert_eq!(report.generated, positions.len() as u64);

    let generator = TerrainGenerator::new(config).unwrap();
    for pos in positions {
        let chunk = store.get_chunk(pos).expect("pregenerated chunk is resident");
        assert_eq!(
            chunk.read().unwrap().sorted_blocks(),
            generator.generate_chunk(pos).sorted_blocks()
        );
    }
}
