mod kinematics_test;
mod trajectory_test;
