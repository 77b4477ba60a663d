use serde::{Deserialize, Serialize};

const MESSAGING_PRODUCT: &str = "whatsapp";
const TEMPLATE_TYPE: &str = "template";
const BODY_COMPONENT: &str = "body";
const TEXT_PARAMETER: &str = "text";

/// A named fill-in value for one positional placeholder of a template.
///
/// The name only helps the caller keep track of which placeholder a value
/// belongs to. It is never sent to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateParameter {
    pub name: String,
    pub value: String,
}

/// Ordered fill-in values for a template, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateParameters(Vec<TemplateParameter>);

impl TemplateParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push(TemplateParameter {
            name: name.into(),
            value: value.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TemplateParameter> {
        self.0.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|p| p.value.as_str())
    }
}

impl<N, V> FromIterator<(N, V)> for TemplateParameters
where
    N: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut parameters = Self::new();
        for (name, value) in iter {
            parameters.push(name, value);
        }
        parameters
    }
}

/// Template message document in the shape the WhatsApp Cloud API expects.
///
/// The envelope is fixed; only the recipient, the template name, the language
/// and the body parameters vary. The template always carries exactly one
/// `body` component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateMessage {
    messaging_product: &'static str,
    to: String,
    #[serde(rename = "type")]
    kind: &'static str,
    template: Template,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Template {
    name: String,
    language: Language,
    components: [Component; 1],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Language {
    code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Component {
    #[serde(rename = "type")]
    kind: &'static str,
    parameters: Vec<TextParameter>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct TextParameter {
    #[serde(rename = "type")]
    kind: &'static str,
    text: String,
}

impl TemplateMessage {
    /// Builds a template message for `recipient`.
    ///
    /// Nothing is validated here: the recipient format, the template name and
    /// the number of parameters are checked by the provider.
    pub fn build(
        recipient: &str,
        template_name: &str,
        language_code: &str,
        parameters: &TemplateParameters,
    ) -> Self {
        let parameters = parameters
            .values()
            .map(|value| TextParameter {
                kind: TEXT_PARAMETER,
                text: value.to_owned(),
            })
            .collect();

        Self {
            messaging_product: MESSAGING_PRODUCT,
            to: recipient.to_owned(),
            kind: TEMPLATE_TYPE,
            template: Template {
                name: template_name.to_owned(),
                language: Language {
                    code: language_code.to_owned(),
                },
                components: [Component {
                    kind: BODY_COMPONENT,
                    parameters,
                }],
            },
        }
    }

    pub fn recipient(&self) -> &str {
        &self.to
    }

    pub fn template_name(&self) -> &str {
        &self.template.name
    }

    pub fn language_code(&self) -> &str {
        &self.template.language.code
    }

    /// Body parameter texts in the order they will be sent.
    pub fn parameters(&self) -> impl Iterator<Item = &str> {
        self.template.components[0]
            .parameters
            .iter()
            .map(|p| p.text.as_str())
    }

    /// Serializes the document into the JSON request body.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
