/// Elevators shuttle between two velocity extremes: every `range` ticks
/// both speed components flip sign. Speeds are whole pixels per tick.
pub fn move_elevators(level: &mut Level, camera: &Camera) {
    for elevator in &mut level.elevators {
        if !elevator.enabled {
            continue;
        }

        elevator.sprite.x += elevator.sprite.speed_x;
        elevator.sprite.y += elevator.sprite.speed_y;
        elevator.counter += 1;
        if elevator.counter >= elevator.range {
            elevator.counter = 0;
            elevator.sprite.speed_x = -elevator.sprite.speed_x;
            elevator.sprite.speed_y = -elevator.sprite.speed_y;
        }

        // off the screen window the platform turns invisible, not disabled
        if elevator.sprite.x + 16 - (camera.tile_x << 4) >= 0
            && elevator.sprite.x - 16 - (camera.tile_x << 4) <= SCREEN_WIDTH_TILES * 16
            && elevator.sprite.y - (camera.tile_y << 4) >= 0
            && elevator.sprite.y - (camera.tile_y << 4) - 16 <= SCREEN_HEIGHT_TILES * 16
        {
            elevator.sprite.invisible = false;
        } else {
            elevator.sprite.invisible = true;
        }
    }
}
