// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Subset of the TensorFlow `Event` protobuf needed to read scalar summaries.
//!
//! Field numbers match `tensorflow/core/util/event.proto` and
//! `tensorflow/core/framework/summary.proto`. Fields not listed here are
//! skipped by the decoder.

/// `DataType` values for the tensor encodings a scalar summary can use.
pub const DT_FLOAT: i32 = 1;
pub const DT_DOUBLE: i32 = 2;
pub const DT_INT32: i32 = 3;
pub const DT_INT64: i32 = 9;

/// Plugin name TensorBoard attaches to scalar summaries written as tensors.
pub const SCALARS_PLUGIN: &str = "scalars";

#[derive(Clone, PartialEq, prost::Message)]
pub struct Event {
    #[prost(double, tag = "1")]
    pub wall_time: f64,
    #[prost(int64, tag = "2")]
    pub step: i64,
    #[prost(oneof = "event::What", tags = "3, 5")]
    pub what: Option<event::What>,
}

pub mod event {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum What {
        #[prost(string, tag = "3")]
        FileVersion(String),
        #[prost(message, tag = "5")]
        Summary(super::Summary),
    }
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Summary {
    #[prost(message, repeated, tag = "1")]
    pub value: Vec<SummaryValue>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct SummaryValue {
    #[prost(string, tag = "1")]
    pub tag: String,
    #[prost(message, optional, tag = "9")]
    pub metadata: Option<SummaryMetadata>,
    #[prost(oneof = "summary_value::Kind", tags = "2, 8")]
    pub kind: Option<summary_value::Kind>,
}

pub mod summary_value {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Kind {
        #[prost(float, tag = "2")]
        SimpleValue(f32),
        #[prost(message, tag = "8")]
        Tensor(super::TensorProto),
    }
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct SummaryMetadata {
    #[prost(message, optional, tag = "1")]
    pub plugin_data: Option<PluginData>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct PluginData {
    #[prost(string, tag = "1")]
    pub plugin_name: String,
    #[prost(bytes = "vec", tag = "2")]
    pub content: Vec<u8>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct TensorProto {
    #[prost(int32, tag = "1")]
    pub dtype: i32,
    #[prost(bytes = "vec", tag = "4")]
    pub tensor_content: Vec<u8>,
    #[prost(float, repeated, tag = "5")]
    pub float_val: Vec<f32>,
    #[prost(double, repeated, tag = "6")]
    pub double_val: Vec<f64>,
    #[prost(int32, repeated, tag = "7")]
    pub int_val: Vec<i32>,
    #[prost(int64, repeated, tag = "10")]
    pub int64_val: Vec<i64>,
}

impl TensorProto {
    /// Reads a single-element tensor as `f64`.
    ///
    /// Returns `None` for unsupported dtypes and for tensors holding anything
    /// other than exactly one value.
    pub fn scalar(&self) -> Option<f64> {
        fn single<T: Copy>(values: &[T]) -> Option<T> {
            match values {
                [v] => Some(*v),
                _ => None,
            }
        }

        if !self.tensor_content.is_empty() {
            return self.scalar_from_content();
        }
        match self.dtype {
            DT_FLOAT => single(&self.float_val).map(f64::from),
            DT_DOUBLE => single(&self.double_val),
            DT_INT32 => single(&self.int_val).map(f64::from),
            #[allow(clippy::cast_precision_loss)]
            DT_INT64 => single(&self.int64_val).map(|v| v as f64),
            _ => None,
        }
    }

    fn scalar_from_content(&self) -> Option<f64> {
        let bytes = self.tensor_content.as_slice();
        match self.dtype {
            DT_FLOAT => <[u8; 4]>::try_from(bytes)
                .ok()
                .map(|b| f64::from(f32::from_le_bytes(b))),
            DT_DOUBLE => <[u8; 8]>::try_from(bytes).ok().map(f64::from_le_bytes),
            DT_INT32 => <[u8; 4]>::try_from(bytes)
                .ok()
                .map(|b| f64::from(i32::from_le_bytes(b))),
            #[allow(clippy::cast_precision_loss)]
            DT_INT64 => <[u8; 8]>::try_from(bytes)
                .ok()
                .map(|b| i64::from_le_bytes(b) as f64),
            _ => None,
        }
    }
}
