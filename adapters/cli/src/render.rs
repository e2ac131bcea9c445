//! Plain-text rendering of a finished labyrinth.

use labyrinth_core::{CellCoord, LabyrinthView, Side, Tile};

/// Live entities drawn over the tiles.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Markers<'a> {
    pub(crate) target: Option<CellCoord>,
    pub(crate) agents: &'a [CellCoord],
    pub(crate) powerups: &'a [CellCoord],
}

/// Renders the labyrinth one character per cell, north at the top.
pub(crate) fn render(view: &LabyrinthView<'_>, markers: &Markers<'_>) -> String {
    let (width, height) = view.dimensions();
    let capacity = usize::try_from((u64::from(width) + 1) * u64::from(height)).unwrap_or(0);
    let mut output = String::with_capacity(capacity);

    for y in (0..height).rev() {
        for x in 0..width {
            let cell = CellCoord::new(x, y);
            output.push(glyph(view, markers, cell));
        }
        output.push('\n');
    }
    output
}

fn glyph(view: &LabyrinthView<'_>, markers: &Markers<'_>, cell: CellCoord) -> char {
    if markers.target == Some(cell) {
        return '@';
    }
    if markers.agents.contains(&cell) {
        return 'G';
    }
    if markers.powerups.contains(&cell) {
        return '*';
    }

    match view.tile(cell) {
        Some(Tile::Floor) => '.',
        Some(Tile::Corridor) => ',',
        Some(Tile::RoomWall(Side::Left | Side::Right)) => '|',
        Some(Tile::RoomWall(Side::Top | Side::Bottom)) => '-',
        Some(Tile::RoomWallCorner(_)) => '+',
        Some(Tile::Wall) | None => '#',
    }
}

#[cfg(test)]
mod tests {
    use labyrinth_core::GenerationConfig;
    use labyrinth_system_generation::generate;
    use labyrinth_world::query;

    use super::*;

    #[test]
    fn single_room_renders_walls_and_floor() {
        let config = GenerationConfig {
            width: 7,
            height: 5,
            min_room_width: 1,
            min_room_height: 1,
            max_depth: 0,
            ..GenerationConfig::default()
        };
        let generated = generate(&config).expect("configuration is valid");
        let view = query::labyrinth_view(&generated.world).expect("generation completed");

        let text = render(&view, &Markers::default());

        assert_eq!(text, "#######\n#+---+#\n#|...|#\n#+---+#\n#######\n");
    }

    #[test]
    fn markers_draw_over_tiles() {
        let config = GenerationConfig {
            width: 7,
            height: 5,
            min_room_width: 1,
            min_room_height: 1,
            max_depth: 0,
            ..GenerationConfig::default()
        };
        let generated = generate(&config).expect("configuration is valid");
        let view = query::labyrinth_view(&generated.world).expect("generation completed");
        let agents = [CellCoord::new(2, 2)];
        let powerups = [CellCoord::new(4, 2), CellCoord::new(2, 2)];

        let text = render(
            &view,
            &Markers {
                target: Some(CellCoord::new(3, 2)),
                agents: &agents,
                powerups: &powerups,
            },
        );

        assert_eq!(text.lines().nth(2), Some("#|G@*|#"));
    }
}
