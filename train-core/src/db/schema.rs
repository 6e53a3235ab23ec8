pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS exercises (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    type TEXT NOT NULL CHECK (type IN ('weight', 'bodyweight', 'cardio', 'assisted')),
    category TEXT CHECK (category IS NULL OR category IN ('Legs-Push', 'Legs-Pull', 'Arms-Push', 'Arms-Pull', 'Core-Push', 'Core-Pull')),
    target_sets INTEGER,
    target_reps INTEGER,
    target_weight REAL,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS routines (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    exercise_id INTEGER NOT NULL REFERENCES exercises(id) ON DELETE CASCADE,
    day_of_week TEXT NOT NULL CHECK (day_of_week IN ('Monday', 'Tuesday', 'Wednesday', 'Thursday', 'Friday', 'Saturday', 'Sunday')),
    order_index INTEGER NOT NULL,
    notes TEXT,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    exercise_id INTEGER NOT NULL REFERENCES exercises(id) ON DELETE CASCADE,
    session_date TEXT NOT NULL,
    weight REAL,
    sets_completed TEXT NOT NULL,
    completed INTEGER NOT NULL DEFAULT 0,
    volume REAL,
    is_pr INTEGER NOT NULL DEFAULT 0,
    notes TEXT,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS day_titles (
    day_of_week TEXT PRIMARY KEY CHECK (day_of_week IN ('Monday', 'Tuesday', 'Wednesday', 'Thursday', 'Friday', 'Saturday', 'Sunday')),
    title TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS metric_types (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    unit TEXT NOT NULL,
    color TEXT NOT NULL,
    order_index INTEGER NOT NULL DEFAULT 0,
    is_default INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS metric_entries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    metric_type_id INTEGER NOT NULL REFERENCES metric_types(id) ON DELETE CASCADE,
    entry_date TEXT NOT NULL,
    value REAL NOT NULL,
    notes TEXT,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_exercises_type ON exercises(type);
CREATE INDEX IF NOT EXISTS idx_routines_exercise ON routines(exercise_id);
CREATE INDEX IF NOT EXISTS idx_history_exercise_date ON history(exercise_id, session_date);
CREATE INDEX IF NOT EXISTS idx_metric_entries_type_date ON metric_entries(metric_type_id, entry_date);

-- Order indices are unique within a day
CREATE UNIQUE INDEX IF NOT EXISTS idx_routines_day_order
    ON routines(day_of_week, order_index);

-- One session per exercise per date
CREATE UNIQUE INDEX IF NOT EXISTS idx_history_one_per_day
    ON history(exercise_id, session_date);

-- Only one personal record per exercise at a time
CREATE UNIQUE INDEX IF NOT EXISTS idx_history_one_pr
    ON history(exercise_id) WHERE is_pr = 1;
"#;

/// Metric types every fresh store starts with. They cannot be deleted.
pub const DEFAULT_METRIC_TYPES: &[(&str, &str, &str)] = &[
    ("Body Weight", "kg", "#4F8EF7"),
    ("Body Fat", "%", "#F76B4F"),
    ("Waist", "cm", "#4FD1A5"),
];
