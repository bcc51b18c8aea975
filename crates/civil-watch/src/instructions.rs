//! Step-by-step safety guidance, looked up by hazard kind.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::hazards::{Hazard, HazardKind};
use crate::records::first_per_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstructionCategory {
    Preparation,
    Emergency,
    Evacuation,
    FirstAid,
    #[serde(other)]
    General,
}

impl InstructionCategory {
    pub fn label(self) -> &'static str {
        match self {
            InstructionCategory::Preparation => "Preparation",
            InstructionCategory::Emergency => "Emergency",
            InstructionCategory::Evacuation => "Evacuation",
            InstructionCategory::FirstAid => "First aid",
            InstructionCategory::General => "General",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionStep {
    pub order: u32,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub is_critical: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub step: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub id: String,
    pub title: String,
    pub category: InstructionCategory,
    #[serde(default)]
    pub hazard_kind: Option<HazardKind>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub steps: Vec<InstructionStep>,
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub estimated_minutes: Option<u32>,
    #[serde(default)]
    pub priority: i32,
}

impl Instruction {
    /// Steps in display order.
    pub fn ordered_steps(&self) -> Vec<&InstructionStep> {
        let mut steps: Vec<&InstructionStep> = self.steps.iter().collect();
        steps.sort_by_key(|step| step.order);
        steps
    }

    /// Completed and total checklist entries.
    pub fn checklist_progress(&self) -> (usize, usize) {
        let done = self.checklist.iter().filter(|item| item.completed).count();
        (done, self.checklist.len())
    }
}

#[derive(Debug, Default)]
pub struct InstructionLibrary {
    instructions: RwLock<HashMap<String, Instruction>>,
}

impl InstructionLibrary {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        let library = Self::default();
        library.replace(instructions);
        library
    }

    pub fn replace(&self, instructions: Vec<Instruction>) {
        let indexed = first_per_id("instructions", instructions, |instruction| {
            instruction.id.as_str()
        })
        .into_iter()
        .map(|instruction| (instruction.id.clone(), instruction))
        .collect();
        *self.instructions.write().expect("instruction lock poisoned") = indexed;
    }

    pub fn get(&self, id: &str) -> Option<Instruction> {
        let guard = self.instructions.read().expect("instruction lock poisoned");
        guard.get(id).cloned()
    }

    /// Instructions for a hazard kind, highest priority first, ties by id.
    pub fn for_kind(&self, kind: HazardKind) -> Vec<Instruction> {
        let guard = self.instructions.read().expect("instruction lock poisoned");
        let mut matches: Vec<Instruction> = guard
            .values()
            .filter(|instruction| instruction.hazard_kind == Some(kind))
            .cloned()
            .collect();
        drop(guard);

        matches.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.id.cmp(&b.id)));
        matches
    }

    pub fn guidance_for(&self, hazard: &Hazard) -> Vec<Instruction> {
        self.for_kind(hazard.kind)
    }
}
