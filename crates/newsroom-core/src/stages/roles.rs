//! Core stage vocabulary: `Stage` and the static `RoleDescriptor` for each.

use serde::{Deserialize, Serialize};

/// Static persona handed to the reasoning backend alongside each prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleDescriptor {
    /// Stable machine key ("planner", "critic", ...). Unique per descriptor.
    pub key: &'static str,
    /// Role title as presented to the model.
    pub role: &'static str,
    pub goal: &'static str,
    pub backstory: &'static str,
}

impl RoleDescriptor {
    /// System message framing the persona for a chat-style backend.
    pub fn system_prompt(&self) -> String {
        format!(
            "Eres {}. {}\nTu objetivo personal es: {}",
            self.role, self.backstory, self.goal
        )
    }
}

const EDITOR_ROLE: &str = "Jefe de Redacción";
const EDITOR_GOAL: &str = "Coordinar y supervisar el proceso completo de generación de noticias, \
desde la planificación hasta la publicación";
const EDITOR_BACKSTORY: &str = "Eres un experimentado jefe de redacción con años de experiencia en \
periodismo. Recibes solicitudes de noticias, analizas el objetivo global, descompones la tarea en un \
plan jerárquico (HTN) con planificación de orden parcial, delegas tareas específicas, revisas el \
trabajo final y apruebas la publicación.";

/// Planner persona: the editor-in-chief decomposing the request.
pub static PLANNER_ROLE: RoleDescriptor = RoleDescriptor {
    key: "planner",
    role: EDITOR_ROLE,
    goal: EDITOR_GOAL,
    backstory: EDITOR_BACKSTORY,
};

/// Investigator persona ("watchdog"): gathers and filters raw information.
pub static INVESTIGATOR_ROLE: RoleDescriptor = RoleDescriptor {
    key: "investigator",
    role: "Investigador (Watchdog)",
    goal: "Investigar, recopilar y filtrar información relevante para la noticia solicitada",
    backstory: "Eres un investigador periodístico experto con acceso a múltiples fuentes. Recopilas \
información cruda de diversas fuentes, la filtras por relevancia y presentas un informe preliminar. \
Cuando se detectan problemas de calidad, sesgos o datos falsos, replanificas la búsqueda \
(backtracking) y buscas fuentes alternativas hasta alcanzar el umbral de calidad requerido.",
};

/// Critic persona: bias and fact checker emitting CODE01 / CODE02.
pub static CRITIC_ROLE: RoleDescriptor = RoleDescriptor {
    key: "critic",
    role: "Analista de Sesgos (Critic)",
    goal: "Evaluar la calidad, veracidad y ausencia de sesgos en la información recopilada",
    backstory: "Eres un analista experto en detección de sesgos, falacias lógicas y verificación de \
datos. Lees los informes del investigador y detectas cualquier sesgo, falacia o dato falso. Cuando \
detectas problemas (CODE01) generas un reporte detallado de errores y solicitas corrección o más \
fuentes. Si no detectas problemas (CODE02) apruebas los hechos para la siguiente fase.",
};

/// Writer persona: drafts the HTML article from validated facts.
pub static WRITER_ROLE: RoleDescriptor = RoleDescriptor {
    key: "writer",
    role: "Redactor (Writer)",
    goal: "Redactar artículos de noticias claros, objetivos y bien estructurados basados en hechos \
validados",
    backstory: "Eres un redactor periodístico profesional. Recibes los hechos validados por el \
analista de sesgos y redactas un artículo que presenta la información de manera clara, objetiva y \
equilibrada, libre de opiniones personales.",
};

/// Reviewer persona: the editor-in-chief again, now signing off.
pub static REVIEWER_ROLE: RoleDescriptor = RoleDescriptor {
    key: "reviewer",
    role: EDITOR_ROLE,
    goal: EDITOR_GOAL,
    backstory: EDITOR_BACKSTORY,
};

/// The five fixed pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Planner,
    Investigator,
    Critic,
    Writer,
    Reviewer,
}

impl Stage {
    /// All stages in pipeline order.
    pub const ALL: [Stage; 5] = [
        Stage::Planner,
        Stage::Investigator,
        Stage::Critic,
        Stage::Writer,
        Stage::Reviewer,
    ];

    pub fn descriptor(self) -> &'static RoleDescriptor {
        match self {
            Stage::Planner => &PLANNER_ROLE,
            Stage::Investigator => &INVESTIGATOR_ROLE,
            Stage::Critic => &CRITIC_ROLE,
            Stage::Writer => &WRITER_ROLE,
            Stage::Reviewer => &REVIEWER_ROLE,
        }
    }

    pub fn name(self) -> &'static str {
        self.descriptor().key
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_descriptor_keys_are_unique() {
        let keys: HashSet<&str> = Stage::ALL.iter().map(|s| s.descriptor().key).collect();
        assert_eq!(keys.len(), Stage::ALL.len());
    }

    #[test]
    fn test_planner_and_reviewer_share_editor_persona() {
        assert_eq!(PLANNER_ROLE.role, REVIEWER_ROLE.role);
        assert_ne!(PLANNER_ROLE.key, REVIEWER_ROLE.key);
    }

    #[test]
    fn test_system_prompt_mentions_role_and_goal() {
        let prompt = CRITIC_ROLE.system_prompt();
        assert!(prompt.contains("Analista de Sesgos"));
        assert!(prompt.contains(CRITIC_ROLE.goal));
    }

    #[test]
    fn test_stage_display_matches_serde_name() {
        for stage in Stage::ALL {
            let json = serde_json::to_value(stage).unwrap();
            assert_eq!(json, serde_json::Value::String(stage.to_string()));
        }
    }
}
