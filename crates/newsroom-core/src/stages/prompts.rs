//! Pure prompt builders.
//!
//! Every prompt is a deterministic function of its typed input: no clock, no
//! randomness, no I/O. Only the backend's response is free text.

use crate::stages::roles::Stage;

/// Typed input for one stage invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageInput<'a> {
    Plan {
        request: &'a str,
    },
    Investigate {
        request: &'a str,
        plan: &'a str,
        sources: Option<&'a str>,
    },
    Reinvestigate {
        request: &'a str,
        feedback: &'a str,
        plan: &'a str,
        sources: Option<&'a str>,
    },
    Critique {
        report: &'a str,
        request: &'a str,
    },
    Write {
        validated_facts: &'a str,
        request: &'a str,
    },
    Review {
        draft: &'a str,
        request: &'a str,
        plan: &'a str,
    },
}

impl StageInput<'_> {
    /// The stage this input is addressed to.
    pub fn stage(&self) -> Stage {
        match self {
            StageInput::Plan { .. } => Stage::Planner,
            StageInput::Investigate { .. } | StageInput::Reinvestigate { .. } => {
                Stage::Investigator
            }
            StageInput::Critique { .. } => Stage::Critic,
            StageInput::Write { .. } => Stage::Writer,
            StageInput::Review { .. } => Stage::Reviewer,
        }
    }
}

/// Build the task prompt for `input`.
pub fn build_prompt(input: &StageInput<'_>) -> String {
    let (body, expected) = match input {
        StageInput::Plan { request } => (planning_body(request), PLAN_EXPECTED),
        StageInput::Investigate {
            request,
            plan,
            sources,
        } => (
            investigation_body(request, plan, *sources),
            INVESTIGATION_EXPECTED,
        ),
        StageInput::Reinvestigate {
            request,
            feedback,
            plan,
            sources,
        } => (
            reinvestigation_body(request, feedback, plan, *sources),
            REINVESTIGATION_EXPECTED,
        ),
        StageInput::Critique { report, request } => {
            (critique_body(report, request), CRITIQUE_EXPECTED)
        }
        StageInput::Write {
            validated_facts,
            request,
        } => (writing_body(validated_facts, request), WRITING_EXPECTED),
        StageInput::Review {
            draft,
            request,
            plan,
        } => (review_body(draft, request, plan), REVIEW_EXPECTED),
    };
    with_expected_output(body, expected)
}

/// Prompt for a free-form question outside the article pipeline.
pub fn query_prompt(query: &str) -> String {
    with_expected_output(
        format!(
            "Analiza y responde la siguiente consulta del usuario:\n{query}\n\n\
Proporciona una respuesta clara, concisa y útil.\n\
Si es sobre noticias o información actual, intenta ser específico y relevante."
        ),
        "Una respuesta clara y bien estructurada sobre el tema consultado",
    )
}

/// Prompt asking for follow-up topic suggestions, one per line.
pub fn suggestions_prompt(query: &str, context: &[String]) -> String {
    let context_block = if context.is_empty() {
        "Sin contexto previo".to_string()
    } else {
        context.join("\n")
    };
    with_expected_output(
        format!(
            "El usuario está interesado en: {query}\n\n\
Contexto de la conversación:\n{context_block}\n\n\
Genera 3-5 sugerencias de temas relacionados o subtemas interesantes que el usuario podría \
querer explorar. Las sugerencias deben ser relevantes al tema principal, específicas y \
accionables, y variadas y complementarias.\n\n\
Responde SOLO con una lista de sugerencias, una por línea."
        ),
        "Una lista de 3-5 sugerencias de temas relacionados",
    )
}

const PLAN_EXPECTED: &str =
    "Un plan jerárquico estructurado con el objetivo global, subtareas y criterios de investigación";
const INVESTIGATION_EXPECTED: &str = "Un informe preliminar estructurado con información relevante, \
fuentes y evaluación de calidad";
const REINVESTIGATION_EXPECTED: &str = "Un nuevo informe preliminar corregido que aborde los \
problemas identificados con fuentes mejoradas";
const CRITIQUE_EXPECTED: &str = "Un análisis crítico con código CODE01 (problemas detectados) o \
CODE02 (aprobado), incluyendo detalles del análisis";
const WRITING_EXPECTED: &str = "Un artículo de noticia completo en formato HTML, envuelto en un \
tag <article>, con header, cuerpo y footer, listo para revisión final";
const REVIEW_EXPECTED: &str =
    "La noticia final aprobada y lista para publicación, o indicación de ajustes necesarios";

fn with_expected_output(body: String, expected: &str) -> String {
    format!("{}\n\nResultado esperado: {expected}", body.trim_end())
}

fn labelled(label: &str, value: &str) -> String {
    if value.trim().is_empty() {
        String::new()
    } else {
        format!("{label}: {value}\n")
    }
}

fn sources_block(sources: Option<&str>) -> String {
    match sources {
        Some(s) => format!("\nArtículos encontrados por el servicio de noticias:\n{s}\n"),
        None => String::new(),
    }
}

fn planning_body(request: &str) -> String {
    format!(
        "Analiza la siguiente solicitud de noticia:\n{request}\n\n\
Realiza las siguientes acciones:\n\
1. Analiza el objetivo global de la noticia solicitada\n\
2. Descompón la tarea en un plan jerárquico (HTN) usando planificación de orden parcial\n\
3. Identifica los subtemas y aspectos que deben investigarse\n\
4. Crea un plan de acción estructurado para el investigador\n\n\
Tu salida debe incluir:\n\
- Objetivo global de la noticia\n\
- Plan jerárquico descompuesto en subtareas\n\
- Aspectos clave a investigar\n\
- Criterios de relevancia para la información"
    )
}

fn investigation_body(request: &str, plan: &str, sources: Option<&str>) -> String {
    format!(
        "Realiza una investigación exhaustiva sobre la siguiente noticia solicitada:\n{request}\n\n\
{plan_line}{sources}\n\
Realiza las siguientes acciones:\n\
1. Recopila información de múltiples fuentes confiables y diversas\n\
2. Filtra la información por relevancia según los criterios establecidos\n\
3. Organiza la información en un informe preliminar estructurado\n\n\
Tu informe preliminar debe incluir:\n\
- Hechos principales verificados\n\
- Fuentes utilizadas\n\
- Contexto relevante\n\
- Información adicional importante\n\
- Nota sobre la calidad y confiabilidad de las fuentes",
        plan_line = labelled("Contexto del plan", plan),
        sources = sources_block(sources),
    )
}

fn reinvestigation_body(
    request: &str,
    feedback: &str,
    plan: &str,
    sources: Option<&str>,
) -> String {
    format!(
        "Se detectaron problemas en el informe preliminar. Debes replanificar la búsqueda \
(backtracking).\n\n\
Solicitud original: {request}\n\
{plan_line}\n\
Reporte de errores del Analista de Sesgos:\n{feedback}\n\
{sources}\n\
Realiza las siguientes acciones:\n\
1. Analiza el reporte de errores detalladamente\n\
2. Replanifica la estrategia de búsqueda\n\
3. Busca fuentes alternativas y adicionales\n\
4. Enfócate en corregir los problemas específicos identificados\n\
5. Verifica la calidad de las nuevas fuentes antes de incluirlas\n\n\
Genera un nuevo informe preliminar corregido que aborde todos los problemas identificados, \
incluya fuentes alternativas y cumpla con los estándares requeridos.",
        plan_line = labelled("Plan original", plan),
        sources = sources_block(sources),
    )
}

fn critique_body(report: &str, request: &str) -> String {
    format!(
        "Analiza el siguiente informe preliminar del investigador:\n{report}\n\n\
Contexto de la solicitud original: {request}\n\n\
Evalúa:\n\
1. DETECCIÓN DE PROBLEMAS (CODE01): ¿existen sesgos, falacias lógicas, datos falsos o no \
verificados? ¿La calidad de las fuentes cumple con el umbral requerido?\n\
2. Si DETECTAS PROBLEMAS (CODE01): genera un reporte detallado, especifica el tipo de problema, \
indica qué correcciones o fuentes adicionales se requieren.\n\
3. Si NO DETECTAS PROBLEMAS (CODE02): aprueba los hechos como válidos y prepara los datos \
limpios para el redactor.\n\n\
Tu respuesta debe indicar claramente CODE01 (problemas detectados) o CODE02 (aprobado)."
    )
}

fn writing_body(validated_facts: &str, request: &str) -> String {
    format!(
        "Redacta un artículo de noticia basado en los siguientes hechos validados:\n\n\
Hechos validados y aprobados:\n{validated_facts}\n\n\
Solicitud original: {request}\n\n\
Usa un estilo periodístico estándar (quién, qué, cuándo, dónde, por qué, cómo), objetivo y \
libre de opiniones personales, y cita las fuentes.\n\n\
FORMATO DE SALIDA REQUERIDO - HTML. Retorna ÚNICAMENTE el HTML, con <article> como elemento \
raíz y exactamente esta estructura:\n\n\
<article>\n\
  <header>\n\
    <h1>Título del artículo</h1>\n\
    <p class=\"entradilla\">Entradilla que resuma los puntos clave</p>\n\
  </header>\n\
  <section class=\"cuerpo\">\n\
    <p>Párrafos del cuerpo...</p>\n\
  </section>\n\
  <footer>\n\
    <p class=\"conclusion\">Conclusión</p>\n\
    <div class=\"fuentes\">\n\
      <h3>Fuentes:</h3>\n\
      <ul><li>Fuente 1</li></ul>\n\
    </div>\n\
  </footer>\n\
</article>"
    )
}

fn review_body(draft: &str, request: &str, plan: &str) -> String {
    format!(
        "Realiza la revisión final del artículo y aprueba su publicación.\n\n\
Solicitud original: {request}\n\
{plan_line}\n\
Artículo redactado:\n{draft}\n\n\
Como Jefe de Redacción verifica que el artículo cumpla el objetivo global, la calidad \
periodística, que la información esté completa y que respete el formato HTML (<article> con \
<header>, <section class=\"cuerpo\"> y <footer>). Si requiere ajustes menores, aplícalos.\n\n\
Tu salida debe ser ÚNICAMENTE la noticia final en HTML, lista para publicación.",
        plan_line = labelled("Plan original", plan),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_is_deterministic() {
        let input = StageInput::Investigate {
            request: "elecciones en X",
            plan: "plan P",
            sources: Some("1. Titular"),
        };
        assert_eq!(build_prompt(&input), build_prompt(&input));
    }

    #[test]
    fn test_input_stage_mapping() {
        let reinvestigate = StageInput::Reinvestigate {
            request: "r",
            feedback: "f",
            plan: "p",
            sources: None,
        };
        assert_eq!(reinvestigate.stage(), Stage::Investigator);
        assert_eq!(StageInput::Plan { request: "r" }.stage(), Stage::Planner);
        assert_eq!(
            StageInput::Review {
                draft: "d",
                request: "r",
                plan: "p"
            }
            .stage(),
            Stage::Reviewer
        );
    }

    #[test]
    fn test_reinvestigation_prompt_carries_feedback_and_plan() {
        let prompt = build_prompt(&StageInput::Reinvestigate {
            request: "elecciones en X",
            feedback: "CODE01: falta contraste de fuentes",
            plan: "plan P",
            sources: None,
        });
        assert!(prompt.contains("CODE01: falta contraste de fuentes"));
        assert!(prompt.contains("Plan original: plan P"));
        assert!(prompt.contains("elecciones en X"));
    }

    #[test]
    fn test_empty_plan_line_is_omitted() {
        let prompt = build_prompt(&StageInput::Investigate {
            request: "tema",
            plan: "  ",
            sources: None,
        });
        assert!(!prompt.contains("Contexto del plan"));
    }

    #[test]
    fn test_sources_block_included_when_present() {
        let prompt = build_prompt(&StageInput::Investigate {
            request: "tema",
            plan: "plan",
            sources: Some("No se encontraron artículos."),
        });
        assert!(prompt.contains("No se encontraron artículos."));
    }

    #[test]
    fn test_writer_prompt_requires_article_structure() {
        let prompt = build_prompt(&StageInput::Write {
            validated_facts: "CODE02 hechos",
            request: "tema",
        });
        assert!(prompt.contains("<section class=\"cuerpo\">"));
        assert!(prompt.contains("<div class=\"fuentes\">"));
        assert!(prompt.contains("CODE02 hechos"));
    }

    #[test]
    fn test_suggestions_prompt_without_context() {
        let prompt = suggestions_prompt("energía solar", &[]);
        assert!(prompt.contains("Sin contexto previo"));
        let prompt = suggestions_prompt("energía solar", &["antes: baterías".to_string()]);
        assert!(prompt.contains("antes: baterías"));
    }
}
