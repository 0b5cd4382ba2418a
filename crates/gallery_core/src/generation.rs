//! crates/gallery_core/src/generation.rs
//!
//! Deterministic half of the code-generation pipeline: the instruction sent
//! to the external model, the repair pass over its raw response, and the
//! fully offline template picker used when the call itself fails.
//!
//! The pipeline never fails outward. Every path resolves to one of three
//! tiers, each carrying a well-formed `{ name, description, code }` triple.

use serde::Deserialize;

/// A generated component payload, whichever tier produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedComponent {
    pub name: String,
    pub description: String,
    pub code: String,
}

/// The outcome of one generation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    /// The model answered with valid, complete JSON.
    Model(GeneratedComponent),
    /// The model answered, but the response needed repair (no parseable
    /// JSON, or required fields missing); code was salvaged from the raw
    /// text.
    Repaired(GeneratedComponent),
    /// The model call itself failed; a canned template was picked from the
    /// prompt keywords.
    Offline(GeneratedComponent),
}

impl Generation {
    /// Resolves one model attempt into a generation outcome.
    ///
    /// `raw` is the result of the single external call: a raw text response,
    /// or whatever error the transport produced. The error content is
    /// irrelevant here; any failure drops to the offline tier.
    pub fn resolve<E>(raw: Result<String, E>, prompt: &str, technologies: &[String]) -> Self {
        match raw {
            Ok(text) => match parse_model_response(&text) {
                Some(component) => Generation::Model(component),
                None => Generation::Repaired(repair_from_raw(&text)),
            },
            Err(_) => Generation::Offline(offline_template(prompt, technologies)),
        }
    }

    pub fn into_component(self) -> GeneratedComponent {
        match self {
            Generation::Model(c) | Generation::Repaired(c) | Generation::Offline(c) => c,
        }
    }

    /// Short label for logging which tier answered.
    pub fn tier(&self) -> &'static str {
        match self {
            Generation::Model(_) => "model",
            Generation::Repaired(_) => "repaired",
            Generation::Offline(_) => "offline",
        }
    }
}

/// Technologies assumed when the caller requests none.
const DEFAULT_TECHNOLOGIES: &str = "React, Tailwind CSS";

/// Builds the instruction sent to the external model.
pub fn build_instruction(prompt: &str, technologies: &[String]) -> String {
    let tech_list = if technologies.is_empty() {
        DEFAULT_TECHNOLOGIES.to_string()
    } else {
        technologies.join(", ")
    };

    format!(
        r#"Create a UI component. The user's request: "{prompt}"

Technologies to use: {tech_list}

Respond with a JSON object in exactly this format:
{{
  "name": "ComponentName",
  "description": "A short description of the component",
  "code": "// component code here"
}}

The code must be a working React component using the listed technologies.
Respond with JSON only, do not add any other explanation."#
    )
}

#[derive(Deserialize)]
struct ModelPayload {
    name: Option<String>,
    description: Option<String>,
    code: Option<String>,
}

/// First-tier parse of a model response.
///
/// Extracts the first-`{`-to-last-`}` substring, parses it as JSON and
/// requires non-empty `name` and `code`. Returns `None` on any failure so
/// the caller can fall through to the repair tier.
pub fn parse_model_response(text: &str) -> Option<GeneratedComponent> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }

    let payload: ModelPayload = serde_json::from_str(&text[start..=end]).ok()?;
    let name = payload.name.filter(|n| !n.is_empty())?;
    let code = payload.code.filter(|c| !c.is_empty())?;

    Some(GeneratedComponent {
        name,
        description: payload.description.unwrap_or_default(),
        code,
    })
}

/// Placeholder identity for second-tier (repaired) responses.
const REPAIRED_NAME: &str = "GeneratedComponent";
const REPAIRED_DESCRIPTION: &str = "Component generated by the model";

/// Language tags stripped from the head of a fenced code block. Longer tags
/// first so "typescript" is not consumed as "ts".
const FENCE_LANGUAGE_TAGS: &[&str] = &["javascript", "typescript", "jsx", "tsx", "js", "ts"];

/// Second-tier response built directly from the raw model text: the first
/// fenced code block's content if there is one, otherwise the text verbatim.
pub fn repair_from_raw(text: &str) -> GeneratedComponent {
    let code = match text.split("```").nth(1) {
        Some(block) => strip_language_tag(block).to_string(),
        None => text.to_string(),
    };

    GeneratedComponent {
        name: REPAIRED_NAME.to_string(),
        description: REPAIRED_DESCRIPTION.to_string(),
        code,
    }
}

fn strip_language_tag(block: &str) -> &str {
    for tag in FENCE_LANGUAGE_TAGS {
        if let Some(rest) = block.strip_prefix(tag) {
            if let Some(rest) = rest.strip_prefix('\n') {
                return rest;
            }
        }
    }
    block
}

/// Third-tier, fully offline template picker.
///
/// Inspects the prompt (case-insensitively) for keyword families, including
/// the Turkish synonyms the original user base writes prompts in. The
/// technology set only selects the typed variant when "typescript" is
/// requested; React and Tailwind are assumed unconditionally.
pub fn offline_template(prompt: &str, technologies: &[String]) -> GeneratedComponent {
    let prompt_lower = prompt.to_lowercase();
    let typed = technologies.iter().any(|t| t == "typescript");

    let (name, description, code) = if prompt_lower.contains("button") || prompt_lower.contains("buton")
    {
        (
            "GradientButton",
            "A gradient-background button that scales up on hover",
            if typed { GRADIENT_BUTTON_TS } else { GRADIENT_BUTTON_JS },
        )
    } else if prompt_lower.contains("card") || prompt_lower.contains("kart") {
        (
            "FeatureCard",
            "A feature card with an icon, a title and a description",
            if typed { FEATURE_CARD_TS } else { FEATURE_CARD_JS },
        )
    } else if prompt_lower.contains("input") || prompt_lower.contains("form") {
        (
            "FormInput",
            "A form input with a label and an error message",
            if typed { FORM_INPUT_TS } else { FORM_INPUT_JS },
        )
    } else {
        (
            "AnimatedComponent",
            "A component generated from the user's request",
            if typed { ANIMATED_TS } else { ANIMATED_JS },
        )
    };

    GeneratedComponent {
        name: name.to_string(),
        description: description.to_string(),
        code: code.trim().to_string(),
    }
}

//=========================================================================================
// Offline Templates
//=========================================================================================

const GRADIENT_BUTTON_TS: &str = r#"
import React from 'react';

interface GradientButtonProps {
  label: string;
  onClick?: () => void;
  variant?: 'primary' | 'secondary';
}

const GradientButton: React.FC<GradientButtonProps> = ({
  label,
  onClick,
  variant = 'primary'
}) => {
  return (
    <button
      className={`
        px-6 py-3 rounded-full font-medium transition-all duration-300
        transform hover:scale-105 hover:shadow-lg
        ${variant === 'primary'
          ? 'bg-gradient-to-r from-blue-600 to-violet-600 text-white'
          : 'bg-white text-gray-800 border border-gray-200'}
      `}
      onClick={onClick}
    >
      {label}
    </button>
  );
};

export default GradientButton;
"#;

const GRADIENT_BUTTON_JS: &str = r#"
import React from 'react';

const GradientButton = ({ label, onClick, variant = 'primary' }) => {
  return (
    <button
      className={`
        px-6 py-3 rounded-full font-medium transition-all duration-300
        transform hover:scale-105 hover:shadow-lg
        ${variant === 'primary'
          ? 'bg-gradient-to-r from-blue-600 to-violet-600 text-white'
          : 'bg-white text-gray-800 border border-gray-200'}
      `}
      onClick={onClick}
    >
      {label}
    </button>
  );
};

export default GradientButton;
"#;

const FEATURE_CARD_TS: &str = r#"
import React from 'react';

interface FeatureCardProps {
  icon: React.ReactNode;
  title: string;
  description: string;
}

const FeatureCard: React.FC<FeatureCardProps> = ({
  icon,
  title,
  description
}) => {
  return (
    <div className="bg-white dark:bg-gray-800 p-6 rounded-xl shadow-md hover:shadow-lg transition-shadow duration-300">
      <div className="w-12 h-12 bg-blue-100 dark:bg-blue-900 rounded-full flex items-center justify-center text-blue-600 dark:text-blue-400 mb-4">
        {icon}
      </div>
      <h3 className="text-xl font-semibold mb-2 text-gray-900 dark:text-white">{title}</h3>
      <p className="text-gray-600 dark:text-gray-300">{description}</p>
    </div>
  );
};

export default FeatureCard;
"#;

const FEATURE_CARD_JS: &str = r#"
import React from 'react';

const FeatureCard = ({ icon, title, description }) => {
  return (
    <div className="bg-white dark:bg-gray-800 p-6 rounded-xl shadow-md hover:shadow-lg transition-shadow duration-300">
      <div className="w-12 h-12 bg-blue-100 dark:bg-blue-900 rounded-full flex items-center justify-center text-blue-600 dark:text-blue-400 mb-4">
        {icon}
      </div>
      <h3 className="text-xl font-semibold mb-2 text-gray-900 dark:text-white">{title}</h3>
      <p className="text-gray-600 dark:text-gray-300">{description}</p>
    </div>
  );
};

export default FeatureCard;
"#;

const FORM_INPUT_TS: &str = r#"
import React from 'react';

interface FormInputProps {
  label: string;
  id: string;
  type?: string;
  value: string;
  onChange: (e: React.ChangeEvent<HTMLInputElement>) => void;
  error?: string;
  placeholder?: string;
}

const FormInput: React.FC<FormInputProps> = ({
  label,
  id,
  type = 'text',
  value,
  onChange,
  error,
  placeholder
}) => {
  return (
    <div className="mb-4">
      <label
        htmlFor={id}
        className="block text-sm font-medium text-gray-700 dark:text-gray-300 mb-1"
      >
        {label}
      </label>
      <input
        id={id}
        type={type}
        value={value}
        onChange={onChange}
        placeholder={placeholder}
        className={`w-full px-3 py-2 border ${
          error
            ? 'border-red-500 focus:ring-red-500 focus:border-red-500'
            : 'border-gray-300 dark:border-gray-600 focus:ring-blue-500 focus:border-blue-500'
        } rounded-md shadow-sm focus:outline-none focus:ring-2 dark:bg-gray-700 dark:text-white`}
      />
      {error && (
        <p className="mt-1 text-sm text-red-600 dark:text-red-400">{error}</p>
      )}
    </div>
  );
};

export default FormInput;
"#;

const FORM_INPUT_JS: &str = r#"
import React from 'react';

const FormInput = ({
  label,
  id,
  type = 'text',
  value,
  onChange,
  error,
  placeholder
}) => {
  return (
    <div className="mb-4">
      <label
        htmlFor={id}
        className="block text-sm font-medium text-gray-700 dark:text-gray-300 mb-1"
      >
        {label}
      </label>
      <input
        id={id}
        type={type}
        value={value}
        onChange={onChange}
        placeholder={placeholder}
        className={`w-full px-3 py-2 border ${
          error
            ? 'border-red-500 focus:ring-red-500 focus:border-red-500'
            : 'border-gray-300 dark:border-gray-600 focus:ring-blue-500 focus:border-blue-500'
        } rounded-md shadow-sm focus:outline-none focus:ring-2 dark:bg-gray-700 dark:text-white`}
      />
      {error && (
        <p className="mt-1 text-sm text-red-600 dark:text-red-400">{error}</p>
      )}
    </div>
  );
};

export default FormInput;
"#;

const ANIMATED_TS: &str = r#"
import React, { useState } from 'react';

interface AnimatedComponentProps {
  title: string;
  content: string;
}

const AnimatedComponent: React.FC<AnimatedComponentProps> = ({
  title,
  content
}) => {
  const [isExpanded, setIsExpanded] = useState(false);

  return (
    <div
      className="bg-white dark:bg-gray-800 rounded-lg overflow-hidden shadow-md hover:shadow-lg transition-all duration-300"
    >
      <div className="p-6">
        <h3 className="text-xl font-semibold mb-2 text-gray-900 dark:text-white">{title}</h3>
        <div
          className={`overflow-hidden transition-all duration-300 ${
            isExpanded ? 'max-h-96' : 'max-h-20'
          }`}
        >
          <p className="text-gray-600 dark:text-gray-300">{content}</p>
        </div>
        <button
          onClick={() => setIsExpanded(!isExpanded)}
          className="mt-4 text-blue-600 dark:text-blue-400 font-medium"
        >
          {isExpanded ? 'Show less' : 'Show more'}
        </button>
      </div>
    </div>
  );
};

export default AnimatedComponent;
"#;

const ANIMATED_JS: &str = r#"
import React, { useState } from 'react';

const AnimatedComponent = ({ title, content }) => {
  const [isExpanded, setIsExpanded] = useState(false);

  return (
    <div
      className="bg-white dark:bg-gray-800 rounded-lg overflow-hidden shadow-md hover:shadow-lg transition-all duration-300"
    >
      <div className="p-6">
        <h3 className="text-xl font-semibold mb-2 text-gray-900 dark:text-white">{title}</h3>
        <div
          className={`overflow-hidden transition-all duration-300 ${
            isExpanded ? 'max-h-96' : 'max-h-20'
          }`}
        >
          <p className="text-gray-600 dark:text-gray-300">{content}</p>
        </div>
        <button
          onClick={() => setIsExpanded(!isExpanded)}
          className="mt-4 text-blue-600 dark:text-blue-400 font-medium"
        >
          {isExpanded ? 'Show less' : 'Show more'}
        </button>
      </div>
    </div>
  );
};

export default AnimatedComponent;
"#;
