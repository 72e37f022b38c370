//! The four-matrix relation set and cross-space feature blending.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::affinity::matrix::{AffinityMatrix, QueryOptions};
use crate::affinity::vector::AggregatedVector;
use crate::config::Config;
use crate::entity::{EntityId, EntityKind};
use crate::error::Result;
use crate::utils::format_size;

/// Which relation space a query runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatrixKind {
    SkillToSkill,
    SkillToTitle,
    TitleToSkill,
    TitleToTitle,
}

impl MatrixKind {
    pub const ALL: [Self; 4] = [
        Self::SkillToSkill,
        Self::SkillToTitle,
        Self::TitleToSkill,
        Self::TitleToTitle,
    ];

    #[must_use]
    pub const fn source_kind(self) -> EntityKind {
        match self {
            Self::SkillToSkill | Self::SkillToTitle => EntityKind::Skill,
            Self::TitleToSkill | Self::TitleToTitle => EntityKind::Title,
        }
    }

    #[must_use]
    pub const fn target_kind(self) -> EntityKind {
        match self {
            Self::SkillToSkill | Self::TitleToSkill => EntityKind::Skill,
            Self::SkillToTitle | Self::TitleToTitle => EntityKind::Title,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SkillToSkill => "skill_to_skill",
            Self::SkillToTitle => "skill_to_title",
            Self::TitleToSkill => "title_to_skill",
            Self::TitleToTitle => "title_to_title",
        }
    }

    /// Provenance tag carried on expansion results, so downstream
    /// consumers can tell which relation space produced a suggestion.
    #[must_use]
    pub const fn method_tag(self) -> &'static str {
        match self {
            Self::SkillToSkill => "skill_to_skill_matrix",
            Self::SkillToTitle => "skill_to_title_matrix",
            Self::TitleToSkill => "title_to_skill_matrix",
            Self::TitleToTitle => "title_to_title_matrix",
        }
    }
}

impl std::fmt::Display for MatrixKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Edge counts and footprint across the four matrices.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MatrixSetStats {
    pub skill_to_skill: usize,
    pub skill_to_title: usize,
    pub title_to_skill: usize,
    pub title_to_title: usize,
    pub total_edges: usize,
    pub approx_bytes: usize,
}

/// All four relation matrices, loaded together and immutable after.
#[derive(Debug)]
pub struct MatrixSet {
    skill_to_skill: AffinityMatrix,
    skill_to_title: AffinityMatrix,
    title_to_skill: AffinityMatrix,
    title_to_title: AffinityMatrix,
}

impl MatrixSet {
    /// Load all four matrices, in parallel since each file parses
    /// independently. Any single failure fails the whole set.
    pub fn load(config: &Config) -> Result<Self> {
        let load_one = |kind: MatrixKind| {
            AffinityMatrix::load(&config.matrix_path(kind), config.matrix_spec(kind))
        };
        let (same_space, cross_space) = rayon::join(
            || {
                rayon::join(
                    || load_one(MatrixKind::SkillToSkill),
                    || load_one(MatrixKind::TitleToTitle),
                )
            },
            || {
                rayon::join(
                    || load_one(MatrixKind::SkillToTitle),
                    || load_one(MatrixKind::TitleToSkill),
                )
            },
        );
        let (skill_to_skill, title_to_title) = same_space;
        let (skill_to_title, title_to_skill) = cross_space;
        let set = Self {
            skill_to_skill: skill_to_skill?,
            skill_to_title: skill_to_title?,
            title_to_skill: title_to_skill?,
            title_to_title: title_to_title?,
        };
        info!(
            edges = set.total_size(),
            footprint = %format_size(set.approx_bytes() as u64),
            "matrix set loaded"
        );
        Ok(set)
    }

    #[must_use]
    pub const fn matrix(&self, kind: MatrixKind) -> &AffinityMatrix {
        match kind {
            MatrixKind::SkillToSkill => &self.skill_to_skill,
            MatrixKind::SkillToTitle => &self.skill_to_title,
            MatrixKind::TitleToSkill => &self.title_to_skill,
            MatrixKind::TitleToTitle => &self.title_to_title,
        }
    }

    /// Run one query against the chosen relation space.
    pub fn query(
        &self,
        kind: MatrixKind,
        sources: &[EntityId],
        opts: &QueryOptions,
    ) -> AggregatedVector {
        self.matrix(kind).query(sources, opts)
    }

    /// Cross-space feature for a target kind: what the selected skills say
    /// and what the selected titles say, each on unit scale so neither
    /// side drowns the other, merged into one vector.
    pub fn blended(
        &self,
        target: EntityKind,
        skill_ids: &[EntityId],
        title_ids: &[EntityId],
        opts: &QueryOptions,
    ) -> AggregatedVector {
        let (from_skills, from_titles) = match target {
            EntityKind::Skill => (MatrixKind::SkillToSkill, MatrixKind::TitleToSkill),
            EntityKind::Title => (MatrixKind::SkillToTitle, MatrixKind::TitleToTitle),
        };
        let unit_opts = QueryOptions {
            normalize: true,
            ..*opts
        };
        let skill_part = self.query(from_skills, skill_ids, &unit_opts);
        let title_part = self.query(from_titles, title_ids, &unit_opts);
        skill_part.combine(&title_part, 1.0)
    }

    /// Total retained edges across all four matrices.
    pub fn total_size(&self) -> usize {
        MatrixKind::ALL
            .iter()
            .map(|&kind| self.matrix(kind).size())
            .sum()
    }

    pub fn approx_bytes(&self) -> usize {
        MatrixKind::ALL
            .iter()
            .map(|&kind| self.matrix(kind).approx_bytes())
            .sum()
    }

    pub fn stats(&self) -> MatrixSetStats {
        MatrixSetStats {
            skill_to_skill: self.skill_to_skill.size(),
            skill_to_title: self.skill_to_title.size(),
            title_to_skill: self.title_to_skill.size(),
            title_to_title: self.title_to_title.size(),
            total_edges: self.total_size(),
            approx_bytes: self.approx_bytes(),
        }
    }
}
