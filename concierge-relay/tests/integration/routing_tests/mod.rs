mod test_frames_routed_by_target;
mod test_remove_user;
mod test_unknown_target_dropped;
