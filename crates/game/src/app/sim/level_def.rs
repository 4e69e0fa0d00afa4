type LevelLoadResult<T> = Result<T, String>;

/// On-disk level schema. The asset pipeline that produces these files is a
/// separate subsystem; this core only validates and converts.
#[derive(Debug, Clone, Deserialize)]
pub struct LevelDefinition {
    pub number: u16,
    #[serde(default)]
    pub is_finish: bool,
    #[serde(default)]
    pub has_cage: bool,
    #[serde(default)]
    pub music: u8,
    #[serde(default)]
    pub boss_power: u8,
    pub width: i16,
    pub height: i16,
    pub scroll_limit_x: i16,
    #[serde(default)]
    pub altitude_zero: i16,
    #[serde(default)]
    pub no_scroll: bool,
    #[serde(default)]
    pub finish_x: i16,
    #[serde(default)]
    pub finish_y: i16,
    pub player: PlayerDef,
    pub tileset: Vec<TileDef>,
    /// Row-major tile ids, `height` rows of `width` entries.
    pub map: Vec<Vec<u8>>,
    #[serde(default)]
    pub enemies: Vec<EnemyDef>,
    #[serde(default)]
    pub objects: Vec<ObjectDef>,
    #[serde(default)]
    pub elevators: Vec<ElevatorDef>,
    #[serde(default)]
    pub bonuses: Vec<BonusDef>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PlayerDef {
    pub x: i16,
    pub y: i16,
    pub hp: u8,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TileDef {
    #[serde(default)]
    pub animation: [u8; 3],
    #[serde(default)]
    pub horiz: u8,
    #[serde(default)]
    pub floor: u8,
    #[serde(default)]
    pub ceil: u8,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct EnemyDef {
    pub kind: u16,
    pub sprite: i16,
    pub x: i16,
    pub y: i16,
    #[serde(default)]
    pub speed_x: i16,
    #[serde(default)]
    pub speed_y: i16,
    #[serde(default)]
    pub flipped: bool,
    #[serde(default)]
    pub power: i16,
    #[serde(default)]
    pub center_x: Option<i16>,
    #[serde(default)]
    pub range_x: i16,
    #[serde(default)]
    pub range_y: i16,
    #[serde(default)]
    pub delay: i16,
    #[serde(default)]
    pub direction: u8,
    #[serde(default)]
    pub walk_speed: i16,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ObjectDef {
    pub sprite: i16,
    pub x: i16,
    pub y: i16,
    #[serde(default)]
    pub flipped: bool,
    #[serde(default)]
    pub flash: bool,
    #[serde(default = "default_true")]
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ElevatorDef {
    pub sprite: i16,
    pub x: i16,
    pub y: i16,
    pub speed_x: i16,
    pub speed_y: i16,
    pub range: u16,
    #[serde(default = "default_true")]
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BonusDef {
    pub x: u8,
    pub y: u8,
    pub bonus_tile: u8,
    pub replace_tile: u8,
}

fn default_true() -> bool {
    true
}

/// Parses and validates a level file, reporting the JSON path of whatever
/// field failed to deserialize.
pub fn load_level(json: &str, assets: AssetCatalog) -> LevelLoadResult<Level> {
    let mut deserializer = serde_json::Deserializer::from_str(json);
    let definition: LevelDefinition = serde_path_to_error::deserialize(&mut deserializer)
        .map_err(|error| format!("level definition at {}: {}", error.path(), error.inner()))?;
    Level::from_definition(definition, assets)
}

impl LevelDefinition {
    fn validate(&self) -> LevelLoadResult<()> {
        if self.width < SCREEN_WIDTH_TILES {
            return Err(format!(
                "level width must be at least {} tiles, got {}",
                SCREEN_WIDTH_TILES, self.width
            ));
        }
        if self.height < SCREEN_HEIGHT_TILES {
            return Err(format!(
                "level height must be at least {} tiles, got {}",
                SCREEN_HEIGHT_TILES, self.height
            ));
        }
        if self.tileset.is_empty() || self.tileset.len() > 256 {
            return Err(format!(
                "tileset must hold 1 to 256 entries, got {}",
                self.tileset.len()
            ));
        }
        if self.map.len() != self.height as usize {
            return Err(format!(
                "map has {} rows, expected {}",
                self.map.len(),
                self.height
            ));
        }
        for (row_index, row) in self.map.iter().enumerate() {
            if row.len() != self.width as usize {
                return Err(format!(
                    "map row {} has {} tiles, expected {}",
                    row_index,
                    row.len(),
                    self.width
                ));
            }
            for (column, id) in row.iter().enumerate() {
                if *id as usize >= self.tileset.len() {
                    return Err(format!(
                        "map tile ({row_index},{column}) references tileset entry {id}, tileset has {}",
                        self.tileset.len()
                    ));
                }
            }
        }
        for (index, tile) in self.tileset.iter().enumerate() {
            if HorizFlag::from_code(tile.horiz).is_none() {
                return Err(format!(
                    "tileset entry {index} has invalid horizontal flag code {}",
                    tile.horiz
                ));
            }
            if FloorFlag::from_code(tile.floor).is_none() {
                return Err(format!(
                    "tileset entry {index} has invalid floor flag code {}",
                    tile.floor
                ));
            }
            if CeilFlag::from_code(tile.ceil).is_none() {
                return Err(format!(
                    "tileset entry {index} has invalid ceiling flag code {}",
                    tile.ceil
                ));
            }
        }
        for (index, enemy) in self.enemies.iter().enumerate() {
            if EnemyBehavior::from_code(enemy.kind).is_none() {
                return Err(format!(
                    "enemy {index} has unknown behavior code {}",
                    enemy.kind
                ));
            }
        }
        check_capacity("enemies", self.enemies.len(), ENEMY_CAPACITY)?;
        check_capacity("objects", self.objects.len(), OBJECT_CAPACITY)?;
        check_capacity("elevators", self.elevators.len(), ELEVATOR_CAPACITY)?;
        check_capacity("bonuses", self.bonuses.len(), BONUS_CAPACITY)?;
        Ok(())
    }
}

fn check_capacity(pool: &str, actual: usize, capacity: usize) -> LevelLoadResult<()> {
    if actual > capacity {
        return Err(format!(
            "level defines {actual} {pool}, capacity is {capacity}"
        ));
    }
    Ok(())
}
