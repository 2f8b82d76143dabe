mod partition;
mod roundtrip;
