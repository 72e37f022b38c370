use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::affinity::{MatrixKind, MatrixSpec, QueryOptions};
use crate::error::{Result, RexError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub matrices: MatricesConfig,
    pub registry: RegistryConfig,
    pub locations: LocationsConfig,
    pub expansion: ExpansionConfig,
}

impl Config {
    /// Layered load: defaults, then an explicit file (or the global plus
    /// per-deployment files), then `REX_*` environment overrides.
    pub fn load(explicit_path: Option<&Path>, data_root: &Path) -> Result<Self> {
        Self::load_with_env(explicit_path, data_root, |key| std::env::var(key).ok())
    }

    fn load_with_env(
        explicit_path: Option<&Path>,
        data_root: &Path,
        get: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let mut config = Self::default();
        config.data.root = data_root.to_path_buf();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| get("REX_CONFIG").map(PathBuf::from));

        if let Some(path) = explicit {
            if let Some(patch) = Self::load_patch(&path)? {
                config.merge_patch(patch);
            }
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            if let Some(local) = Self::load_local(data_root)? {
                config.merge_patch(local);
            }
        }

        config.apply_env_overrides_from(&get)?;

        Ok(config)
    }

    /// Where data files live when the caller has no opinion: the
    /// `REX_DATA_ROOT` environment variable, else the platform data dir.
    pub fn discover_data_root() -> Result<PathBuf> {
        Self::discover_data_root_from(|key| std::env::var(key).ok())
    }

    fn discover_data_root_from(get: impl Fn(&str) -> Option<String>) -> Result<PathBuf> {
        if let Some(root) = get("REX_DATA_ROOT").filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(root));
        }
        dirs::data_dir()
            .map(|dir| dir.join("rex"))
            .ok_or_else(|| RexError::MissingConfig("data directory not found".to_string()))
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        let path = dirs::config_dir()
            .ok_or_else(|| RexError::MissingConfig("config directory not found".to_string()))?
            .join("rex/config.toml");
        Self::load_patch(&path)
    }

    fn load_local(data_root: &Path) -> Result<Option<ConfigPatch>> {
        let path = data_root.join("config.toml");
        Self::load_patch(&path)
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| RexError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| RexError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.data {
            self.data.merge(patch);
        }
        if let Some(patch) = patch.matrices {
            self.matrices.merge(patch);
        }
        if let Some(patch) = patch.registry {
            self.registry.merge(patch);
        }
        if let Some(patch) = patch.locations {
            self.locations.merge(patch);
        }
        if let Some(patch) = patch.expansion {
            self.expansion.merge(patch);
        }
    }

    /// Apply `REX_*` overrides supplied by `get`; `load` feeds it the
    /// process environment.
    fn apply_env_overrides_from(&mut self, get: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = get("REX_DATA_ROOT") {
            self.data.root = PathBuf::from(value);
        }

        if let Some(value) = get("REX_MATRICES_DIR") {
            self.matrices.dir = value;
        }

        if let Some(value) = get("REX_REGISTRY_DIR") {
            self.registry.dir = value;
        }
        if let Some(value) = get("REX_REGISTRY_SKILLS_FILE") {
            self.registry.skills_file = value;
        }
        if let Some(value) = get("REX_REGISTRY_TITLES_FILE") {
            self.registry.titles_file = value;
        }

        if let Some(value) = get("REX_LOCATIONS_DIR") {
            self.locations.dir = value;
        }
        if let Some(value) = get("REX_LOCATIONS_COORDINATES_FILE") {
            self.locations.coordinates_file = value;
        }
        if let Some(value) = get("REX_LOCATIONS_NAMES_FILE") {
            self.locations.names_file = value;
        }
        if let Some(value) = get("REX_LOCATIONS_RADIUS_KM") {
            self.locations.default_radius_km = parse_f64("REX_LOCATIONS_RADIUS_KM", &value)?;
        }
        if let Some(value) = get("REX_LOCATIONS_MAX_RESULTS") {
            self.locations.max_results = parse_usize("REX_LOCATIONS_MAX_RESULTS", &value)?;
        }
        if let Some(value) = get("REX_LOCATIONS_SUGGESTION_LIMIT") {
            self.locations.suggestion_limit =
                parse_usize("REX_LOCATIONS_SUGGESTION_LIMIT", &value)?;
        }

        if let Some(value) = get("REX_EXPANSION_TOP_N") {
            self.expansion.top_n = parse_usize("REX_EXPANSION_TOP_N", &value)?;
        }
        if let Some(value) = get("REX_EXPANSION_NORMALIZE") {
            self.expansion.normalize = parse_bool(&value);
        }
        if let Some(value) = get("REX_EXPANSION_EXCLUDE_INPUTS") {
            self.expansion.exclude_inputs = parse_bool(&value);
        }

        Ok(())
    }

    pub fn matrix_path(&self, kind: MatrixKind) -> PathBuf {
        self.data
            .root
            .join(&self.matrices.dir)
            .join(&self.matrices.file_config(kind).file)
    }

    pub fn matrix_spec(&self, kind: MatrixKind) -> MatrixSpec {
        let file = self.matrices.file_config(kind);
        MatrixSpec {
            score_threshold: file.score_threshold,
            top_k_per_source: file.top_k_per_source,
        }
    }

    pub fn skills_path(&self) -> PathBuf {
        self.data
            .root
            .join(&self.registry.dir)
            .join(&self.registry.skills_file)
    }

    pub fn titles_path(&self) -> PathBuf {
        self.data
            .root
            .join(&self.registry.dir)
            .join(&self.registry.titles_file)
    }

    pub fn coordinates_path(&self) -> PathBuf {
        self.data
            .root
            .join(&self.locations.dir)
            .join(&self.locations.coordinates_file)
    }

    pub fn location_names_path(&self) -> PathBuf {
        self.data
            .root
            .join(&self.locations.dir)
            .join(&self.locations.names_file)
    }

    /// Query settings for expansion calls that do not override them.
    pub fn query_options(&self) -> QueryOptions {
        QueryOptions {
            top_n: self.expansion.top_n,
            normalize: self.expansion.normalize,
            exclude_sources: self.expansion.exclude_inputs,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub root: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
        }
    }
}

impl DataConfig {
    fn merge(&mut self, patch: DataPatch) {
        if let Some(value) = patch.root {
            self.root = value;
        }
    }
}

/// File name and retention settings for one relation matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixFileConfig {
    pub file: String,
    pub score_threshold: f32,
    pub top_k_per_source: usize,
}

impl MatrixFileConfig {
    fn new(file: &str, score_threshold: f32, top_k_per_source: usize) -> Self {
        Self {
            file: file.to_string(),
            score_threshold,
            top_k_per_source,
        }
    }

    fn merge(&mut self, patch: MatrixFilePatch) {
        if let Some(value) = patch.file {
            self.file = value;
        }
        if let Some(value) = patch.score_threshold {
            self.score_threshold = value;
        }
        if let Some(value) = patch.top_k_per_source {
            self.top_k_per_source = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatricesConfig {
    pub dir: String,
    pub skill_to_skill: MatrixFileConfig,
    pub skill_to_title: MatrixFileConfig,
    pub title_to_skill: MatrixFileConfig,
    pub title_to_title: MatrixFileConfig,
}

impl Default for MatricesConfig {
    fn default() -> Self {
        // Reference thresholds: co-occurrence counts run orders of
        // magnitude higher within the skill space than across spaces.
        Self {
            dir: "matrices".to_string(),
            skill_to_skill: MatrixFileConfig::new("skill_to_skill.jsonl", 200.0, 100),
            skill_to_title: MatrixFileConfig::new("skill_to_title.jsonl", 50.0, 100),
            title_to_skill: MatrixFileConfig::new("title_to_skill.jsonl", 50.0, 100),
            title_to_title: MatrixFileConfig::new("title_to_title.jsonl", 5.0, 100),
        }
    }
}

impl MatricesConfig {
    #[must_use]
    pub const fn file_config(&self, kind: MatrixKind) -> &MatrixFileConfig {
        match kind {
            MatrixKind::SkillToSkill => &self.skill_to_skill,
            MatrixKind::SkillToTitle => &self.skill_to_title,
            MatrixKind::TitleToSkill => &self.title_to_skill,
            MatrixKind::TitleToTitle => &self.title_to_title,
        }
    }

    fn merge(&mut self, patch: MatricesPatch) {
        if let Some(value) = patch.dir {
            self.dir = value;
        }
        if let Some(patch) = patch.skill_to_skill {
            self.skill_to_skill.merge(patch);
        }
        if let Some(patch) = patch.skill_to_title {
            self.skill_to_title.merge(patch);
        }
        if let Some(patch) = patch.title_to_skill {
            self.title_to_skill.merge(patch);
        }
        if let Some(patch) = patch.title_to_title {
            self.title_to_title.merge(patch);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub dir: String,
    pub skills_file: String,
    pub titles_file: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            dir: "vocab".to_string(),
            skills_file: "skills.json".to_string(),
            titles_file: "titles.json".to_string(),
        }
    }
}

impl RegistryConfig {
    fn merge(&mut self, patch: RegistryPatch) {
        if let Some(value) = patch.dir {
            self.dir = value;
        }
        if let Some(value) = patch.skills_file {
            self.skills_file = value;
        }
        if let Some(value) = patch.titles_file {
            self.titles_file = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationsConfig {
    pub dir: String,
    pub coordinates_file: String,
    pub names_file: String,
    pub default_radius_km: f64,
    pub max_results: usize,
    pub suggestion_limit: usize,
}

impl Default for LocationsConfig {
    fn default() -> Self {
        Self {
            dir: "locations".to_string(),
            coordinates_file: "coordinates.json".to_string(),
            names_file: "names.json".to_string(),
            default_radius_km: 50.0,
            max_results: 5,
            suggestion_limit: 5,
        }
    }
}

impl LocationsConfig {
    fn merge(&mut self, patch: LocationsPatch) {
        if let Some(value) = patch.dir {
            self.dir = value;
        }
        if let Some(value) = patch.coordinates_file {
            self.coordinates_file = value;
        }
        if let Some(value) = patch.names_file {
            self.names_file = value;
        }
        if let Some(value) = patch.default_radius_km {
            self.default_radius_km = value;
        }
        if let Some(value) = patch.max_results {
            self.max_results = value;
        }
        if let Some(value) = patch.suggestion_limit {
            self.suggestion_limit = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionConfig {
    pub top_n: usize,
    pub normalize: bool,
    pub exclude_inputs: bool,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            top_n: 5,
            normalize: true,
            exclude_inputs: true,
        }
    }
}

impl ExpansionConfig {
    fn merge(&mut self, patch: ExpansionPatch) {
        if let Some(value) = patch.top_n {
            self.top_n = value;
        }
        if let Some(value) = patch.normalize {
            self.normalize = value;
        }
        if let Some(value) = patch.exclude_inputs {
            self.exclude_inputs = value;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    pub data: Option<DataPatch>,
    pub matrices: Option<MatricesPatch>,
    pub registry: Option<RegistryPatch>,
    pub locations: Option<LocationsPatch>,
    pub expansion: Option<ExpansionPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct DataPatch {
    pub root: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct MatricesPatch {
    pub dir: Option<String>,
    pub skill_to_skill: Option<MatrixFilePatch>,
    pub skill_to_title: Option<MatrixFilePatch>,
    pub title_to_skill: Option<MatrixFilePatch>,
    pub title_to_title: Option<MatrixFilePatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct MatrixFilePatch {
    pub file: Option<String>,
    pub score_threshold: Option<f32>,
    pub top_k_per_source: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RegistryPatch {
    pub dir: Option<String>,
    pub skills_file: Option<String>,
    pub titles_file: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct LocationsPatch {
    pub dir: Option<String>,
    pub coordinates_file: Option<String>,
    pub names_file: Option<String>,
    pub default_radius_km: Option<f64>,
    pub max_results: Option<usize>,
    pub suggestion_limit: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ExpansionPatch {
    pub top_n: Option<usize>,
    pub normalize: Option<bool>,
    pub exclude_inputs: Option<bool>,
}

fn parse_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn parse_usize(key: &str, value: &str) -> Result<usize> {
    value
        .parse()
        .map_err(|err| RexError::Config(format!("invalid {key} value {value}: {err}")))
}

fn parse_f64(key: &str, value: &str) -> Result<f64> {
    value
        .parse()
        .map_err(|err| RexError::Config(format!("invalid {key} value {value}: {err}")))
}
