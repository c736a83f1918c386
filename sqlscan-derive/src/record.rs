//! Record derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Result};

use crate::attrs::parse_fields;

pub fn derive_record_impl(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let type_name = name.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let field_configs = parse_fields(&input)?;
    let persisted: Vec<_> = field_configs.iter().filter(|c| !c.skip).collect();

    let field_descriptors: Vec<TokenStream> = persisted
        .iter()
        .map(|config| {
            let field_name = config.name();
            let column_name = &config.column_name;
            if config.primary_key {
                quote! { sqlscan::Field::primary_key(#field_name, #column_name) }
            } else {
                quote! { sqlscan::Field::new(#field_name, #column_name) }
            }
        })
        .collect();

    let value_exprs: Vec<TokenStream> = persisted
        .iter()
        .map(|config| {
            let field_ident = &config.ident;
            quote! { sqlscan::ToValue::to_value(&self.#field_ident) }
        })
        .collect();

    let set_primary_key = match persisted.iter().find(|c| c.primary_key) {
        Some(config) => {
            let field_ident = &config.ident;
            let field_name = config.name();
            quote! {
                self.#field_ident = sqlscan::FromValue::from_value(sqlscan::Value::I64(id))
                    .map_err(|e| {
                        sqlscan::Error::Mapping(format!(
                            "cannot store key {} in {}.{}: {}",
                            id, #type_name, #field_name, e
                        ))
                    })?;
                Ok(())
            }
        }
        None => quote! {
            Err(sqlscan::Error::Mapping(format!(
                "{} has no primary key to store {} in",
                #type_name, id
            )))
        },
    };

    let expanded = quote! {
        impl #impl_generics sqlscan::Record for #name #ty_generics #where_clause {
            fn fields() -> &'static [sqlscan::Field] {
                const FIELDS: &[sqlscan::Field] = &[#(#field_descriptors),*];
                FIELDS
            }

            fn values(&self) -> std::vec::Vec<sqlscan::Value> {
                std::vec![#(#value_exprs),*]
            }

            fn set_primary_key(&mut self, id: i64) -> sqlscan::Result<()> {
                #set_primary_key
            }
        }
    };

    Ok(expanded)
}
