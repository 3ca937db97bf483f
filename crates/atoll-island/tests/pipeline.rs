use atoll_config::{ConfigError, GeneratorSettings};
use atoll_island::{
    GenerationError, Host, IslandGenerator, SceneRecorder, Stage, TileLibrary, TileService,
    tile_world_position,
};
use atoll_terrain::{SurfaceVolume, TileKind};
use glam::Vec3;

fn settings(seed: u32) -> GeneratorSettings {
    let mut settings = GeneratorSettings {
        seed: Some(seed),
        ..GeneratorSettings::default()
    };
    settings.heightfield.grid_size = [12, 10];
    settings.heightfield.radius_offset = 2.0;
    settings.floor.subdivision = 2;
    settings
}

fn library(settings: &GeneratorSettings) -> TileLibrary {
    TileLibrary::standard(Vec3::from_array(settings.tile_scale))
}

#[test]
fn test_same_seed_reproduces_island() {
    let settings = settings(42);
    let run = || {
        let mut tiles = library(&settings);
        let mut decorations = SceneRecorder::new();
        let mut host = Host::new()
            .with_tiles(&mut tiles)
            .with_decorations(&mut decorations);
        IslandGenerator::new(settings.clone())
            .generate(false, &mut host)
            .unwrap()
    };

    let a = run();
    let b = run();
    assert_eq!(a.seed, 42);
    assert_eq!(a.stepped, b.stepped);
    assert_eq!(a.ramps.as_slice(), b.ramps.as_slice());
    assert_eq!(a.tiles, b.tiles);
    assert_eq!(a.floor, b.floor);
    assert_eq!(a.border_rocks, b.border_rocks);
    assert_eq!(a.flora, b.flora);
}

#[test]
fn test_full_run_reports_every_stage_in_order() {
    let settings = settings(7);
    let mut tiles = library(&settings);
    let mut decorations = SceneRecorder::new();
    let mut stages = Vec::new();
    let mut record = |stage: Stage| stages.push(stage);

    let island = {
        let mut host = Host::new()
            .with_tiles(&mut tiles)
            .with_decorations(&mut decorations)
            .with_progress(&mut record);
        IslandGenerator::new(settings)
            .generate(false, &mut host)
            .unwrap()
    };

    assert_eq!(stages, Stage::ALL);
    assert_eq!(island.completed, Stage::Flora);
    assert!(island.bake_navmesh);
    assert!(island.land_cells() > 0);
    assert_eq!(island.tiles.len(), island.land_cells());
    assert_eq!(tiles.instances().len(), island.tiles.len());
    assert_eq!(
        decorations.len(),
        island.border_rocks.len() + island.flora.len()
    );
}

#[test]
fn test_tiles_sit_on_their_cells() {
    let settings = settings(99);
    let mut tiles = library(&settings);
    let island = {
        let mut host = Host::new().with_tiles(&mut tiles);
        IslandGenerator::new(settings.clone())
            .generate(false, &mut host)
            .unwrap()
    };

    let scale = Vec3::from_array(settings.tile_scale);
    let ramps = island
        .tiles
        .iter()
        .filter(|t| t.layout.kind == TileKind::RampFull)
        .count();
    assert_eq!(ramps, island.ramps.len());

    for tile in &island.tiles {
        let (x, y) = tile.cell;
        assert_eq!(tile.level, island.stepped[(x, y)]);
        assert!(tile.level > 0);
        assert_eq!(
            tile.world_position,
            tile_world_position(12, 10, x, y, tile.level, scale)
        );
        assert_eq!(tile.yaw_degrees, tile.layout.rotation.yaw_degrees());
    }
}

#[test]
fn test_border_rocks_cover_every_border_point() {
    let settings = settings(1234);
    let mut tiles = library(&settings);
    let island = {
        let mut host = Host::new().with_tiles(&mut tiles);
        IslandGenerator::new(settings)
            .generate(false, &mut host)
            .unwrap()
    };

    let offset = island.floor.as_ref().unwrap().offset;
    assert!(!island.border.is_empty());
    for point in &island.border {
        let anchored = *point + offset;
        assert!(
            island
                .border_rocks
                .iter()
                .any(|rock| rock.position.distance(anchored) < rock.radius),
            "border point {point} is not covered"
        );
    }
    for rock in &island.border_rocks {
        assert!((0.5..1.5).contains(&rock.scale));
    }
}

#[test]
fn test_flora_keeps_its_distance() {
    let settings = settings(2024);
    let mut tiles = library(&settings);
    let island = {
        let mut host = Host::new().with_tiles(&mut tiles);
        IslandGenerator::new(settings)
            .generate(false, &mut host)
            .unwrap()
    };

    assert!(!island.flora.is_empty());
    for (i, earlier) in island.flora.iter().enumerate() {
        for later in &island.flora[i + 1..] {
            assert!(later.position.distance(earlier.position) > earlier.radius);
        }
    }
}

#[test]
fn test_tiles_without_surfaces_get_no_flora() {
    let settings = settings(2024);
    let scale = Vec3::from_array(settings.tile_scale);
    let top = SurfaceVolume::new(
        "top",
        Vec3::new(0.0, scale.y, 0.0),
        Vec3::new(scale.x / 2.0, 0.0, scale.z / 2.0),
    );
    let mut tiles = TileLibrary::new();
    for kind in TileKind::ALL {
        tiles.register(kind, kind.name());
        if kind != TileKind::Full {
            tiles.add_surface(kind, top.clone());
        }
    }

    let island = {
        let mut host = Host::new().with_tiles(&mut tiles);
        IslandGenerator::new(settings)
            .generate(false, &mut host)
            .unwrap()
    };

    assert_eq!(island.completed, Stage::Flora);
    let bare: Vec<_> = island
        .tiles
        .iter()
        .filter(|t| t.layout.kind == TileKind::Full)
        .collect();
    assert!(!bare.is_empty(), "expected interior full tiles");
    assert!(!island.flora.is_empty());
    for plant in &island.flora {
        for tile in &bare {
            let d = (plant.position - tile.world_position).abs();
            assert!(
                d.x >= scale.x / 2.0 || d.z >= scale.z / 2.0,
                "flora {} landed inside bare tile {:?}",
                plant.position,
                tile.cell
            );
        }
    }
}

#[test]
fn test_disabled_tiles_stop_after_layout() {
    let mut settings = settings(5);
    settings.do_tile_generation = false;
    let island = IslandGenerator::new(settings)
        .generate(false, &mut Host::new())
        .unwrap();

    assert_eq!(island.completed, Stage::Ramps);
    assert!(island.tiles.is_empty());
    assert!(island.floor.is_none());
    assert!(island.flora.is_empty());
    assert!(!island.bake_navmesh);
}

#[test]
fn test_small_island_without_smoothing_or_ramps() {
    let mut settings = GeneratorSettings {
        seed: Some(42),
        do_heightfield_smoothing: false,
        do_ramp_generation: false,
        do_tile_generation: false,
        ..GeneratorSettings::default()
    };
    settings.heightfield.grid_size = [5, 5];
    settings.heightfield.radius = 1.0;
    settings.heightfield.radius_weight = 1.0;
    settings.heightfield.max_height = 2;
    settings.heightfield.noise_scale = [1.0, 1.0];

    let mut generator = IslandGenerator::new(settings);
    let first = generator.generate(false, &mut Host::new()).unwrap();
    let second = generator.generate(false, &mut Host::new()).unwrap();

    assert_eq!(first.completed, Stage::Stepping);
    assert!(first.ramps.is_empty());
    assert_eq!(first.stepped, second.stepped);

    let grid = &first.stepped;
    let top = grid.iter().map(|(_, _, level)| *level).max().unwrap();
    assert!((1..=2).contains(&top), "island has no land or exceeds max height");

    // Highest cell nearest the centre.
    let (px, py, _) = grid
        .iter()
        .filter(|(_, _, level)| **level == top)
        .min_by_key(|(x, y, _)| (x.abs_diff(2)).max(y.abs_diff(2)))
        .unwrap();
    assert!(
        px.abs_diff(2) <= 1 && py.abs_diff(2) <= 1,
        "peak at ({px}, {py}) is not next to the centre"
    );

    // Walking out from the peak in any of the eight directions never climbs.
    for (dx, dy) in [
        (-1, -1),
        (0, -1),
        (1, -1),
        (-1, 0),
        (1, 0),
        (-1, 1),
        (0, 1),
        (1, 1),
    ] {
        let (mut x, mut y) = (px as i64, py as i64);
        let mut previous = top;
        while let Some(&level) = grid.get(x + dx, y + dy) {
            assert!(
                level <= previous,
                "level rises to {level} at ({}, {}) walking out from the peak",
                x + dx,
                y + dy
            );
            previous = level;
            x += dx;
            y += dy;
        }
    }
}

#[test]
fn test_missing_tile_service() {
    let err = IslandGenerator::new(settings(3))
        .generate(false, &mut Host::new())
        .unwrap_err();
    assert!(matches!(err, GenerationError::MissingTileService));
}

#[test]
fn test_offline_host_cannot_instantiate() {
    let settings = settings(3);
    let mut tiles = library(&settings);
    tiles.set_offline(true);
    assert!(!tiles.can_instantiate());

    let mut host = Host::new().with_tiles(&mut tiles);
    let err = IslandGenerator::new(settings)
        .generate(false, &mut host)
        .unwrap_err();
    assert!(matches!(err, GenerationError::HostCannotInstantiate));
}

#[test]
fn test_missing_flora_set() {
    let mut settings = settings(3);
    settings.floraset = None;
    let mut tiles = library(&settings);
    let mut host = Host::new().with_tiles(&mut tiles);
    let err = IslandGenerator::new(settings)
        .generate(false, &mut host)
        .unwrap_err();
    assert!(matches!(err, GenerationError::MissingFloraSet(Stage::Border)));
}

#[test]
fn test_invalid_settings_rejected_before_any_stage() {
    let mut settings = settings(3);
    settings.floor.subdivision = 0;
    let mut stages = Vec::new();
    let mut record = |stage: Stage| stages.push(stage);
    let err = {
        let mut host = Host::new().with_progress(&mut record);
        IslandGenerator::new(settings)
            .generate(false, &mut host)
            .unwrap_err()
    };
    assert!(matches!(
        err,
        GenerationError::InvalidSettings(ConfigError::Invalid { .. })
    ));
    assert!(stages.is_empty());
}

#[test]
fn test_new_seed_is_kept() {
    let mut settings = settings(0);
    settings.do_tile_generation = false;
    let mut generator = IslandGenerator::new(settings);
    assert_eq!(generator.seed(), None);

    let island = generator.generate(false, &mut Host::new()).unwrap();
    assert!(island.seed > 0);
    assert_eq!(generator.seed(), Some(island.seed));

    let again = generator.generate(false, &mut Host::new()).unwrap();
    assert_eq!(again.seed, island.seed);
    assert_eq!(again.stepped, island.stepped);
}
