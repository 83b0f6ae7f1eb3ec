//! Lead CRM API Library
//!
//! Stores sales leads, records their interactions, scores them with an
//! external language model and evaluates generated outreach messages.
//!
//! # Modules
//!
//! - `api`: HTTP-facing components.
//! - `core`: Domain logic (pipeline, scoring, evaluation) and shared errors/models.
//! - `data`: Data access layer.
//! - `integrations`: External service integrations.
//! - `circuit_breaker`: Circuit breaker guarding the language model.
//! - `config`: Configuration management.
//! - `db`: Database connection and schema bootstrap.
//! - `errors`: Error handling types.
//! - `evaluation`: Outreach message checklist.
//! - `handlers`: HTTP request handlers.
//! - `lead_storage`: Lead and interaction record store.
//! - `llm_client`: Text completion provider trait and xAI client.
//! - `models`: Core data models.
//! - `pipeline`: Lead stage transitions.
//! - `prompts`: Policy text for the language model.
//! - `routes`: Router assembly.
//! - `scoring`: Lead qualification rubric.
//! - `services`: Lead workflows.

pub mod api;
pub mod core;
pub mod data;
pub mod integrations;

pub mod circuit_breaker;
pub mod config;
pub mod db;
pub mod errors;
pub mod evaluation;
pub mod handlers;
pub mod lead_storage;
pub mod llm_client;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod routes;
pub mod scoring;
pub mod services;
