//! The fixed resource set for the "LancamentoSemente1" lead-capture launch.
//!
//! Email bodies are opaque payloads kept under `content/emails/`.

use super::placeholder::{id_of, key_of};
use super::plan::Plan;
use super::spec::ResourceSpec;
use super::types::ResourceType;
use crate::error::ProvisionResult;
use serde_json::{Value, json};

pub const FIELD_ALIAS: &str = "profissao";
pub const CATEGORY_TITLE: &str = "Lançamento Semente 1";
pub const TAG_NAME: &str = "Semente1";
pub const SEGMENT_NAME: &str = "Leads Semente1";
pub const CAMPAIGN_NAME: &str = "LancamentoSemente1";
pub const FORM_NAME: &str = "LeadLandingPageForm";
pub const FORM_ALIAS: &str = "leadlandingpageform";
pub const TEST_EMAIL_NAME: &str = "Test SendGrid Configuration";

/// One email of the welcome sequence
struct SequenceEmail {
    spec_id: &'static str,
    name: &'static str,
    subject: &'static str,
    content: &'static str,
    delay_days: u32,
}

const SEQUENCE: [SequenceEmail; 3] = [
    SequenceEmail {
        spec_id: "email_d0",
        name: "Bem-vindo ao Método Superare - D+0",
        subject: "Bem-vindo ao Método Superare! 🌟",
        content: include_str!("../../content/emails/welcome_d0.html"),
        delay_days: 0,
    },
    SequenceEmail {
        spec_id: "email_d1",
        name: "Método Superare - Fundamentos - D+1",
        subject: "Os 3 Pilares do Método Superare 📚",
        content: include_str!("../../content/emails/fundamentals_d1.html"),
        delay_days: 1,
    },
    SequenceEmail {
        spec_id: "email_d2",
        name: "Método Superare - Aplicação Prática - D+2",
        subject: "Como Aplicar o Método Superare na Prática 🚀",
        content: include_str!("../../content/emails/practice_d2.html"),
        delay_days: 2,
    },
];

fn profession_options() -> Value {
    json!([
        {"label": "Educação Física", "value": "educacao_fisica"},
        {"label": "Fisioterapia", "value": "fisioterapia"},
        {"label": "Medicina Esportiva", "value": "medicina_esportiva"},
        {"label": "Medicina", "value": "medicina"},
        {"label": "Empreendedor", "value": "empreendedor"},
        {"label": "Outro", "value": "outro"}
    ])
}

fn event_name(delay_days: u32) -> String {
    format!("Send email (D+{})", delay_days)
}

/// Email-send event payload; the first one fires immediately, later ones after a delay
fn send_event(email: &SequenceEmail) -> Value {
    let mut event = json!({
        "name": event_name(email.delay_days),
        "type": "email.send",
        "eventType": "action",
        "order": email.delay_days + 1,
        "properties": {
            "email": id_of(email.spec_id),
            "send_delay": email.delay_days
        }
    });

    if email.delay_days == 0 {
        event["triggerMode"] = json!("immediate");
    } else {
        event["triggerMode"] = json!("interval");
        event["triggerInterval"] = json!(email.delay_days);
        event["triggerIntervalUnit"] = json!("d");
    }

    event
}

/// All resources of the launch, in declaration order
pub fn launch_specs() -> Vec<ResourceSpec> {
    let mut specs = Vec::new();

    specs.push(ResourceSpec::new(
        "field",
        ResourceType::CustomField,
        FIELD_ALIAS,
        json!({
            "label": "Profissão",
            "alias": FIELD_ALIAS,
            "type": "select",
            "group": "core",
            "object": "contact",
            "properties": {"list": profession_options()}
        }),
    ));

    specs.push(ResourceSpec::new(
        "category",
        ResourceType::Category,
        CATEGORY_TITLE,
        json!({
            "title": CATEGORY_TITLE,
            "alias": "lancamento-semente-1",
            "bundle": "global",
            "description": "Recursos da campanha de lançamento Semente 1"
        }),
    ));

    for email in &SEQUENCE {
        specs.push(
            ResourceSpec::new(
                email.spec_id,
                ResourceType::Email,
                email.name,
                json!({
                    "name": email.name,
                    "subject": email.subject,
                    "content": email.content,
                    "category": id_of("category"),
                    "isPublished": true
                }),
            )
            .depends_on("category"),
        );
    }

    specs.push(ResourceSpec::new(
        "tag",
        ResourceType::Tag,
        TAG_NAME,
        json!({"tag": TAG_NAME}),
    ));

    specs.push(
        ResourceSpec::new(
            "segment",
            ResourceType::Segment,
            SEGMENT_NAME,
            json!({
                "name": SEGMENT_NAME,
                "alias": "leads-semente1",
                "isPublished": true,
                "filters": [{
                    "glue": "and",
                    "field": "tags",
                    "object": "lead",
                    "type": "tags",
                    "operator": "in",
                    "properties": {"filter": [id_of("tag")]}
                }]
            }),
        )
        .depends_on("tag"),
    );

    let first = &SEQUENCE[0];
    let mut first_event = send_event(first);
    first_event["id"] = json!("new1");
    specs.push(
        ResourceSpec::new(
            "campaign",
            ResourceType::Campaign,
            CAMPAIGN_NAME,
            json!({
                "name": CAMPAIGN_NAME,
                "description": "Campanha de lançamento para captura de leads",
                "category": id_of("category"),
                "isPublished": true,
                "lists": [{"id": id_of("segment")}],
                "events": [first_event]
            }),
        )
        .depends_on("category")
        .depends_on("segment")
        .depends_on(first.spec_id),
    );

    for email in SEQUENCE.iter().skip(1) {
        specs.push(
            ResourceSpec::new(
                format!("event_d{}", email.delay_days),
                ResourceType::CampaignEvent,
                event_name(email.delay_days),
                send_event(email),
            )
            .scoped_to("campaign")
            .depends_on(email.spec_id),
        );
    }

    specs.push(
        ResourceSpec::new(
            "form",
            ResourceType::Form,
            FORM_NAME,
            json!({
                "name": FORM_NAME,
                "alias": FORM_ALIAS,
                "formType": "campaign",
                "isPublished": true,
                "fields": [
                    {
                        "label": "Nome",
                        "type": "text",
                        "alias": "firstname",
                        "isRequired": true,
                        "validationMessage": "O campo Nome é obrigatório."
                    },
                    {
                        "label": "Email",
                        "type": "email",
                        "alias": "email",
                        "isRequired": true,
                        "validationMessage": "Por favor, insira um email válido."
                    },
                    {
                        "label": "Código do País",
                        "type": "text",
                        "alias": "country_code",
                        "isRequired": true,
                        "properties": {"maxLength": 4},
                        "validationMessage": "O código do país é obrigatório (ex: +55, +1, +44)."
                    },
                    {
                        "label": "Celular",
                        "type": "tel",
                        "alias": "mobile",
                        "isRequired": true,
                        "validationMessage": "O campo Celular é obrigatório."
                    },
                    {
                        "label": "Área de Atuação",
                        "type": "select",
                        "alias": key_of("field"),
                        "leadField": key_of("field"),
                        "isRequired": true,
                        "properties": {"list": profession_options()},
                        "validationMessage": "Por favor, selecione sua área de atuação."
                    }
                ],
                "actions": [
                    {
                        "name": "Add to campaign",
                        "type": "campaign.add",
                        "properties": {"campaign": id_of("campaign")}
                    },
                    {
                        "name": "Add tag",
                        "type": "contact.addtag",
                        "properties": {"tags": [key_of("tag")]}
                    }
                ]
            }),
        )
        .depends_on("field")
        .depends_on("tag")
        .depends_on("campaign"),
    );

    specs
}

/// The validated launch plan
pub fn launch_plan() -> ProvisionResult<Plan> {
    Plan::new(launch_specs())
}

/// Standalone plan for the mailer check email
pub fn test_email_plan() -> ProvisionResult<Plan> {
    Plan::new(vec![ResourceSpec::new(
        "test_email",
        ResourceType::Email,
        TEST_EMAIL_NAME,
        json!({
            "name": TEST_EMAIL_NAME,
            "subject": "Test Email via SendGrid",
            "content": include_str!("../../content/emails/sendgrid_test.html"),
            "isPublished": true
        }),
    )])
}
