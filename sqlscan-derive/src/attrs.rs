//! `#[sqlscan(...)]` attribute parsing shared by both derives

use heck::{ToKebabCase, ToLowerCamelCase, ToShoutySnakeCase, ToSnakeCase, ToUpperCamelCase};
use syn::{spanned::Spanned, Data, DeriveInput, Error, Field, Fields, Ident, LitStr, Result};

/// Container-level column naming rule
#[derive(Clone, Copy)]
enum RenameRule {
    Lower,
    Upper,
    Snake,
    ScreamingSnake,
    Camel,
    Pascal,
    Kebab,
}

impl RenameRule {
    fn parse(lit: &LitStr) -> Result<Self> {
        match lit.value().as_str() {
            "lowercase" => Ok(Self::Lower),
            "UPPERCASE" => Ok(Self::Upper),
            "snake_case" => Ok(Self::Snake),
            "SCREAMING_SNAKE_CASE" => Ok(Self::ScreamingSnake),
            "camelCase" => Ok(Self::Camel),
            "PascalCase" => Ok(Self::Pascal),
            "kebab-case" => Ok(Self::Kebab),
            other => Err(Error::new(lit.span(), format!("unknown rename_all rule `{}`", other))),
        }
    }

    fn apply(self, name: &str) -> String {
        match self {
            Self::Lower => name.to_lowercase(),
            Self::Upper => name.to_uppercase(),
            Self::Snake => name.to_snake_case(),
            Self::ScreamingSnake => name.to_shouty_snake_case(),
            Self::Camel => name.to_lower_camel_case(),
            Self::Pascal => name.to_upper_camel_case(),
            Self::Kebab => name.to_kebab_case(),
        }
    }
}

/// One struct field and its mapping
pub struct FieldConfig {
    /// The field identifier
    pub ident: Ident,
    /// Column name to use (may be renamed)
    pub column_name: String,
    /// Whether this field is the primary key
    pub primary_key: bool,
    /// Whether this field is left out of the mapping
    pub skip: bool,
    /// The field type
    pub ty: syn::Type,
}

impl FieldConfig {
    /// Field name without a raw-identifier prefix
    pub fn name(&self) -> String {
        unraw(&self.ident)
    }
}

fn unraw(ident: &Ident) -> String {
    let name = ident.to_string();
    match name.strip_prefix("r#") {
        Some(stripped) => stripped.to_string(),
        None => name,
    }
}

fn parse_rename_all(input: &DeriveInput) -> Result<Option<RenameRule>> {
    let mut rule = None;
    for attr in &input.attrs {
        if attr.path().is_ident("sqlscan") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename_all") {
                    let lit: LitStr = meta.value()?.parse()?;
                    rule = Some(RenameRule::parse(&lit)?);
                    Ok(())
                } else {
                    Err(meta.error("unknown sqlscan container attribute"))
                }
            })?;
        }
    }
    Ok(rule)
}

fn parse_field_config(field: &Field, rule: Option<RenameRule>) -> Result<FieldConfig> {
    let ident = field
        .ident
        .clone()
        .ok_or_else(|| Error::new(field.span(), "tuple structs are not supported"))?;

    let mut rename = None;
    let mut primary_key = false;
    let mut skip = false;

    for attr in &field.attrs {
        if attr.path().is_ident("sqlscan") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let lit: LitStr = meta.value()?.parse()?;
                    rename = Some(lit.value());
                } else if meta.path.is_ident("pk") {
                    primary_key = true;
                } else if meta.path.is_ident("skip") {
                    skip = true;
                } else {
                    return Err(meta.error(format!(
                        "unknown sqlscan attribute `{}`",
                        meta.path
                            .get_ident()
                            .map(|i| i.to_string())
                            .unwrap_or_default()
                    )));
                }
                Ok(())
            })?;
        }
    }

    if primary_key && skip {
        return Err(Error::new(field.span(), "the primary key field cannot be skipped"));
    }

    let column_name = rename.unwrap_or_else(|| {
        let name = unraw(&ident);
        match rule {
            Some(rule) => rule.apply(&name),
            None => name,
        }
    });

    Ok(FieldConfig {
        ident,
        column_name,
        primary_key,
        skip,
        ty: field.ty.clone(),
    })
}

/// Parse every field of a struct with named fields, in declaration order.
pub fn parse_fields(input: &DeriveInput) -> Result<Vec<FieldConfig>> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => return Err(Error::new(input.span(), "only named fields are supported")),
        },
        _ => return Err(Error::new(input.span(), "only structs are supported")),
    };

    let rule = parse_rename_all(input)?;
    let configs = fields
        .iter()
        .map(|field| parse_field_config(field, rule))
        .collect::<Result<Vec<_>>>()?;

    let mut keys = fields
        .iter()
        .zip(&configs)
        .filter(|(_, config)| config.primary_key);
    if let (Some(_), Some((second, _))) = (keys.next(), keys.next()) {
        return Err(Error::new(
            second.span(),
            "at most one field can be marked #[sqlscan(pk)]",
        ));
    }

    Ok(configs)
}
