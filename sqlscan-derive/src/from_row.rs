//! FromRow derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Result};

use crate::attrs::parse_fields;

pub fn derive_from_row_impl(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let type_name = name.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let field_configs = parse_fields(&input)?;

    // Persistable fields bind to consecutive column positions
    let mut position = 0usize;
    let field_extractions: Vec<TokenStream> = field_configs
        .iter()
        .map(|config| {
            let field_ident = &config.ident;
            let ty = &config.ty;

            if config.skip {
                quote! {
                    #field_ident: <#ty as std::default::Default>::default()
                }
            } else {
                let index = position;
                position += 1;
                quote! {
                    #field_ident: sqlscan::RowExt::get::<#ty>(row, #index)?
                }
            }
        })
        .collect();

    let column_names: Vec<&str> = field_configs
        .iter()
        .filter(|c| !c.skip)
        .map(|c| c.column_name.as_str())
        .collect();
    let column_count = column_names.len();

    let expanded = quote! {
        impl #impl_generics sqlscan::FromRow for #name #ty_generics #where_clause {
            fn from_row<R: sqlscan::Row>(row: &R) -> sqlscan::Result<Self> {
                sqlscan::traits::expect_columns(row, #column_count, #type_name)?;
                Ok(Self {
                    #(#field_extractions),*
                })
            }

            fn column_names() -> &'static [&'static str] {
                &[#(#column_names),*]
            }
        }
    };

    Ok(expanded)
}
